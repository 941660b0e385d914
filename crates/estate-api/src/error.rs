//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] estate_core::Error),
}

impl ApiError {
  /// Convert a backend error through the core taxonomy.
  pub fn store<E: Into<estate_core::Error>>(e: E) -> Self {
    let core: estate_core::Error = e.into();
    Self::from(core)
  }
}

impl From<estate_core::Error> for ApiError {
  fn from(e: estate_core::Error) -> Self {
    use estate_core::Error as E;
    match e {
      E::MissingField(_) | E::UnknownStatus(_) => ApiError::BadRequest(e.to_string()),
      E::VisitorNotFound(_) | E::GroupNotFound(_) => ApiError::NotFound(e.to_string()),
      E::InvalidTransition { .. } | E::GateRefused { .. } => {
        ApiError::Conflict(e.to_string())
      }
      E::Storage(_) | E::Unexpected(_) => ApiError::Store(e),
    }
  }
}

/// A body that does not decode is reported in the same JSON shape as every
/// other client error.
impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
