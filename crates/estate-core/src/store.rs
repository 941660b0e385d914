//! Storage traits for visitors and group registrations.
//!
//! The traits are implemented by storage backends (e.g.
//! `estate-store-sqlite`). The lifecycle service and the HTTP layers depend
//! on these abstractions, not on any concrete backend.
//!
//! Every backend error must convert into [`crate::Error`] so callers can tell
//! a storage failure apart from a bug without knowing the backend.

use std::future::Future;

use crate::{
  group::{GroupId, GroupRegistration, NewGroupRegistration},
  visitor::{GateEvent, ResidentId, Visitor, VisitorId, VisitorRecord, VisitorStatus},
};

// ─── Visitors ────────────────────────────────────────────────────────────────

/// Durable record storage for visitors.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`). No ordering is promised by the
/// list methods.
pub trait VisitorStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Insert a [`VisitorRecord::New`] and return it with its assigned
  /// identity, or write back the status of a [`VisitorRecord::Stored`].
  ///
  /// Updating an identity that has no row is a not-found error.
  fn save(
    &self,
    record: VisitorRecord,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Retrieve a visitor by identity. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: VisitorId,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// All visitors whose status equals `status`.
  fn find_by_status(
    &self,
    status: VisitorStatus,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + '_;

  /// All visitors hosted by `resident_id`.
  fn find_by_resident_id(
    &self,
    resident_id: ResidentId,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + '_;

  /// Every visitor in the store.
  fn list_visitors(
    &self,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + '_;

  /// Stamp the current time into the column for `event` and return the
  /// updated visitor. No other field is touched. Updating an identity that
  /// has no row is a not-found error.
  fn record_gate_event(
    &self,
    id: VisitorId,
    event: GateEvent,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;
}

// ─── Groups ──────────────────────────────────────────────────────────────────

/// Insert-only storage for group registrations.
pub trait GroupStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Insert one registration. `None` means the insert affected no rows.
  fn insert_group(
    &self,
    group: NewGroupRegistration,
  ) -> impl Future<Output = Result<Option<GroupRegistration>, Self::Error>> + Send + '_;

  fn find_group(
    &self,
    id: GroupId,
  ) -> impl Future<Output = Result<Option<GroupRegistration>, Self::Error>> + Send + '_;

  fn list_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<GroupRegistration>, Self::Error>> + Send + '_;
}
