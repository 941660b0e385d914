//! Error type for `estate-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] estate_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A column held text that does not decode into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Driver failures are storage failures; anything that went wrong decoding a
/// row is unexpected.
impl From<Error> for estate_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Database(db) => estate_core::Error::Storage(Box::new(db)),
      other @ Error::Decode(_) => estate_core::Error::Unexpected(Box::new(other)),
    }
  }
}
