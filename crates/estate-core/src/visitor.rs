//! Visitors and their approval lifecycle.
//!
//! A visitor is a resident-sponsored visit request. It enters the system as
//! [`VisitorStatus::Pending`] and is moved to `Approved` or `Rejected` by the
//! lifecycle service. Once approved, the gate records a single check-in and
//! check-out against it. No other field changes after creation.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Store-assigned identity of a visitor row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VisitorId(pub i64);

impl fmt::Display for VisitorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// The resident hosting a visitor. Residents are not owned by this crate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResidentId(pub i64);

impl fmt::Display for ResidentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Approval state of a visitor.
///
/// The textual form (`"Pending"`, `"Approved"`, `"Rejected"`) is what the
/// store persists and what status filters match against, case-sensitively.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
pub enum VisitorStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl VisitorStatus {
  /// Parse the stored textual form, failing with [`Error::UnknownStatus`].
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Transition rules ────────────────────────────────────────────────────────

/// Which status changes the lifecycle service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
  /// Any visitor may be approved or rejected regardless of its current
  /// status. Approving an approved visitor re-persists `Approved`, and a
  /// decision can be overturned.
  #[default]
  Unguarded,
  /// Decisions are only taken on pending visitors. Re-applying the current
  /// status is accepted so repeated approve/reject calls stay idempotent.
  PendingOnly,
}

impl TransitionPolicy {
  /// Check whether visitor `id` may move from `from` to `to`.
  pub fn check(
    self,
    id: VisitorId,
    from: VisitorStatus,
    to: VisitorStatus,
  ) -> Result<()> {
    let allowed = match self {
      Self::Unguarded => to != VisitorStatus::Pending || from == to,
      Self::PendingOnly => (from == VisitorStatus::Pending && to != from) || from == to,
    };
    if allowed {
      Ok(())
    } else {
      Err(Error::InvalidTransition { id, from, to })
    }
  }
}

// ─── Gate presence ───────────────────────────────────────────────────────────

/// A movement through the estate gate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum GateEvent {
  CheckIn,
  CheckOut,
}

/// Why the gate refused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum GateRefusal {
  #[strum(serialize = "visitor is not approved")]
  NotApproved,
  #[strum(serialize = "visitor already checked in")]
  AlreadyCheckedIn,
  #[strum(serialize = "visitor is not checked in")]
  NotCheckedIn,
  #[strum(serialize = "visitor already checked out")]
  AlreadyCheckedOut,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
  pub visitor_id:     VisitorId,
  pub resident_id:    ResidentId,
  pub full_name:      String,
  pub contact:        Option<String>,
  pub purpose:        Option<String>,
  pub visit_date:     NaiveDate,
  pub status:         VisitorStatus,
  /// Server-assigned creation time.
  pub created_at:     DateTime<Utc>,
  /// Stamped by the store when the gate records the event.
  #[serde(default)]
  pub check_in_time:  Option<DateTime<Utc>>,
  #[serde(default)]
  pub check_out_time: Option<DateTime<Utc>>,
}

impl Visitor {
  /// Whether the gate may record `event` for this visitor now.
  ///
  /// A pass is single-use: one check-in, then one check-out.
  pub fn check_gate(&self, event: GateEvent) -> Result<()> {
    use GateRefusal::*;

    let refusal = match event {
      GateEvent::CheckIn if self.check_in_time.is_some() => Some(AlreadyCheckedIn),
      GateEvent::CheckIn if self.status != VisitorStatus::Approved => Some(NotApproved),
      GateEvent::CheckOut if self.check_out_time.is_some() => Some(AlreadyCheckedOut),
      GateEvent::CheckOut if self.check_in_time.is_none() => Some(NotCheckedIn),
      GateEvent::CheckIn | GateEvent::CheckOut => None,
    };
    match refusal {
      Some(reason) => Err(Error::GateRefused { id: self.visitor_id, event, reason }),
      None => Ok(()),
    }
  }
}

/// Caller-supplied input for a visitor that has no identity yet.
///
/// `status` never crosses the wire: a `status` key in a request body is
/// ignored, and
/// [`VisitorService::preapprove`](crate::service::VisitorService::preapprove)
/// overwrites the field with `Pending` regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisitor {
  pub resident_id: ResidentId,
  pub full_name:   String,
  #[serde(default)]
  pub contact:     Option<String>,
  #[serde(default)]
  pub purpose:     Option<String>,
  pub visit_date:  NaiveDate,
  #[serde(skip)]
  pub status:      VisitorStatus,
}

impl NewVisitor {
  pub fn new(
    resident_id: ResidentId,
    full_name: impl Into<String>,
    visit_date: NaiveDate,
  ) -> Self {
    Self {
      resident_id,
      full_name: full_name.into(),
      contact: None,
      purpose: None,
      visit_date,
      status: VisitorStatus::default(),
    }
  }

  /// Trim text fields and reject a blank name.
  pub fn normalized(mut self) -> Result<Self> {
    let name = self.full_name.trim();
    if name.is_empty() {
      return Err(Error::MissingField("full_name"));
    }
    self.full_name = name.to_owned();
    self.contact = non_blank(self.contact);
    self.purpose = non_blank(self.purpose);
    Ok(self)
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// What [`VisitorStore::save`](crate::store::VisitorStore::save) accepts.
///
/// A record without identity is inserted; a record with identity has its
/// mutable field (`status`) written back.
#[derive(Debug, Clone)]
pub enum VisitorRecord {
  New(NewVisitor),
  Stored(Visitor),
}

impl From<NewVisitor> for VisitorRecord {
  fn from(v: NewVisitor) -> Self { Self::New(v) }
}

impl From<Visitor> for VisitorRecord {
  fn from(v: Visitor) -> Self { Self::Stored(v) }
}
