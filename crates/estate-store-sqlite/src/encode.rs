//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, and visitor status as its exact textual form.

use chrono::{DateTime, NaiveDate, Utc};
use estate_core::{
  group::{GroupId, GroupRegistration},
  visitor::{ResidentId, Visitor, VisitorId, VisitorStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── VisitorStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: VisitorStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<VisitorStatus> {
  VisitorStatus::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawVisitor::from_row`].
pub const VISITOR_COLUMNS: &str = "visitor_id, resident_id, full_name, contact, purpose, \
   visit_date, status, created_at, check_in_time, check_out_time";

/// Raw values read directly from a `visitors` row.
pub struct RawVisitor {
  pub visitor_id:     i64,
  pub resident_id:    i64,
  pub full_name:      String,
  pub contact:        Option<String>,
  pub purpose:        Option<String>,
  pub visit_date:     String,
  pub status:         String,
  pub created_at:     String,
  pub check_in_time:  Option<String>,
  pub check_out_time: Option<String>,
}

impl RawVisitor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor_id:     row.get(0)?,
      resident_id:    row.get(1)?,
      full_name:      row.get(2)?,
      contact:        row.get(3)?,
      purpose:        row.get(4)?,
      visit_date:     row.get(5)?,
      status:         row.get(6)?,
      created_at:     row.get(7)?,
      check_in_time:  row.get(8)?,
      check_out_time: row.get(9)?,
    })
  }

  pub fn into_visitor(self) -> Result<Visitor> {
    Ok(Visitor {
      visitor_id:     VisitorId(self.visitor_id),
      resident_id:    ResidentId(self.resident_id),
      full_name:      self.full_name,
      contact:        self.contact,
      purpose:        self.purpose,
      visit_date:     decode_date(&self.visit_date)?,
      status:         decode_status(&self.status)?,
      created_at:     decode_dt(&self.created_at)?,
      check_in_time:  self.check_in_time.as_deref().map(decode_dt).transpose()?,
      check_out_time: self.check_out_time.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawGroup::from_row`].
pub const GROUP_COLUMNS: &str =
  "group_id, group_name, purpose, visit_date, host_id, members, registered_at";

/// Raw values read directly from a `group_access` row.
pub struct RawGroup {
  pub group_id:      i64,
  pub group_name:    String,
  pub purpose:       String,
  pub visit_date:    String,
  pub host_id:       String,
  pub members:       String,
  pub registered_at: String,
}

impl RawGroup {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      group_id:      row.get(0)?,
      group_name:    row.get(1)?,
      purpose:       row.get(2)?,
      visit_date:    row.get(3)?,
      host_id:       row.get(4)?,
      members:       row.get(5)?,
      registered_at: row.get(6)?,
    })
  }

  pub fn into_group(self) -> Result<GroupRegistration> {
    Ok(GroupRegistration {
      group_id:      GroupId(self.group_id),
      group_name:    self.group_name,
      purpose:       self.purpose,
      visit_date:    self.visit_date,
      host_id:       self.host_id,
      members:       self.members,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}
