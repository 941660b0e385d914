//! Registration errors and their plain-text responses.
//!
//! The display text of each variant is exactly the body sent to the client.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("All fields are required!")]
  MissingFields,
  #[error("Registration failed. Try again.")]
  NotInserted,
  #[error("Database Error: {0}")]
  Database(String),
  #[error("Unexpected Error: {0}")]
  Unexpected(String),
}

impl From<estate_core::Error> for Error {
  fn from(e: estate_core::Error) -> Self {
    match e {
      estate_core::Error::MissingField(_) => Error::MissingFields,
      estate_core::Error::Storage(inner) => Error::Database(inner.to_string()),
      other => Error::Unexpected(other.to_string()),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match self {
      Error::MissingFields => StatusCode::BAD_REQUEST,
      Error::NotInserted => StatusCode::INTERNAL_SERVER_ERROR,
      Error::Database(ref msg) | Error::Unexpected(ref msg) => {
        tracing::error!(error = %msg, "group registration failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, self.to_string()).into_response()
  }
}
