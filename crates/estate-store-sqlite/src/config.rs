//! Connection settings handed to [`SqliteStore::open`](crate::SqliteStore::open).

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Where the database lives and how long a writer waits on a locked file.
///
/// Deserialises from the flat `store_path` / `store_busy_timeout_ms` keys so
/// it can be flattened into a larger configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  #[serde(rename = "store_path")]
  pub path:            PathBuf,
  #[serde(rename = "store_busy_timeout_ms", default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 { 5_000 }

impl StoreConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), busy_timeout_ms: default_busy_timeout_ms() }
  }

  pub fn busy_timeout(&self) -> Duration {
    Duration::from_millis(self.busy_timeout_ms)
  }
}
