//! Error types for `estate-core`.

use thiserror::Error;

use crate::{
  group::GroupId,
  visitor::{GateEvent, GateRefusal, VisitorId, VisitorStatus},
};

/// Boxed error carried by the storage-facing variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was absent or blank after trimming.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("visitor not found: {0}")]
  VisitorNotFound(VisitorId),

  #[error("group registration not found: {0}")]
  GroupNotFound(GroupId),

  #[error("visitor {id} cannot move from {from} to {to}")]
  InvalidTransition {
    id:   VisitorId,
    from: VisitorStatus,
    to:   VisitorStatus,
  },

  /// The gate refused to record a check-in or check-out.
  #[error("visitor {id} refused {event}: {reason}")]
  GateRefused {
    id:     VisitorId,
    event:  GateEvent,
    reason: GateRefusal,
  },

  #[error("unknown visitor status: {0:?}")]
  UnknownStatus(String),

  /// Connectivity or constraint failure reported by the persistence layer.
  #[error("{0}")]
  Storage(#[source] BoxError),

  #[error("{0}")]
  Unexpected(#[source] BoxError),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::VisitorNotFound(_) | Self::GroupNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
