//! Handlers for the visitor lifecycle endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visitors` | Optional `?status=Pending\|Approved\|Rejected`, `?resident_id=<id>` |
//! | `POST` | `/visitors` | Body: [`NewVisitor`]; returns 201 + stored visitor, always `Pending` |
//! | `GET`  | `/visitors/pending` | Visitors awaiting a decision |
//! | `GET`  | `/visitors/:id` | 404 if not found |
//! | `POST` | `/visitors/:id/approve` | Returns the updated visitor |
//! | `POST` | `/visitors/:id/reject` | Returns the updated visitor |
//! | `POST` | `/visitors/:id/check-in` | Approved visitors only; 409 otherwise |
//! | `POST` | `/visitors/:id/check-out` | Checked-in visitors only; 409 otherwise |
//! | `GET`  | `/residents/:id/visitors` | Visitors hosted by one resident |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use estate_core::{
  store::{GroupStore, VisitorStore},
  visitor::{NewVisitor, ResidentId, Visitor, VisitorId, VisitorStatus},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Exact, case-sensitive status name.
  pub status:      Option<String>,
  pub resident_id: Option<ResidentId>,
}

/// `GET /visitors[?status=<status>][&resident_id=<id>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let status = params
    .status
    .as_deref()
    .map(VisitorStatus::parse)
    .transpose()?;

  let visitors = match (status, params.resident_id) {
    (Some(status), resident) => {
      let mut found = state
        .store
        .find_by_status(status)
        .await
        .map_err(ApiError::store)?;
      if let Some(r) = resident {
        found.retain(|v| v.resident_id == r);
      }
      found
    }
    (None, Some(r)) => state.visitors.visitors_for_resident(r).await?,
    (None, None) => state
      .store
      .list_visitors()
      .await
      .map_err(ApiError::store)?,
  };

  Ok(Json(visitors))
}

/// `GET /visitors/pending`
pub async fn pending<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  Ok(Json(state.visitors.list_pending().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /visitors/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<VisitorId>,
) -> Result<Json<Visitor>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  Ok(Json(state.visitors.find(id).await?))
}

/// `GET /residents/:id/visitors`
pub async fn by_resident<S>(
  State(state): State<ApiState<S>>,
  Path(resident_id): Path<ResidentId>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  Ok(Json(state.visitors.visitors_for_resident(resident_id).await?))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /visitors` — returns 201 + the stored [`Visitor`].
///
/// Any `status` in the body is ignored; new visitors always start `Pending`.
pub async fn preapprove<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewVisitor>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let Json(body) = body?;
  let visitor = state.visitors.preapprove(body).await?;
  tracing::info!(
    visitor_id = %visitor.visitor_id,
    resident_id = %visitor.resident_id,
    "visitor pre-approved"
  );
  Ok((StatusCode::CREATED, Json(visitor)))
}

/// `POST /visitors/:id/approve`
pub async fn approve<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<VisitorId>,
) -> Result<Json<Visitor>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let visitor = state.visitors.approve(id).await?;
  tracing::info!(visitor_id = %id, "visitor approved");
  Ok(Json(visitor))
}

/// `POST /visitors/:id/reject`
pub async fn reject<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<VisitorId>,
) -> Result<Json<Visitor>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let visitor = state.visitors.reject(id).await?;
  tracing::info!(visitor_id = %id, "visitor rejected");
  Ok(Json(visitor))
}

// ─── Gate ─────────────────────────────────────────────────────────────────────

/// `POST /visitors/:id/check-in`
pub async fn check_in<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<VisitorId>,
) -> Result<Json<Visitor>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let visitor = state.visitors.check_in(id).await?;
  tracing::info!(visitor_id = %id, "visitor checked in");
  Ok(Json(visitor))
}

/// `POST /visitors/:id/check-out`
pub async fn check_out<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<VisitorId>,
) -> Result<Json<Visitor>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let visitor = state.visitors.check_out(id).await?;
  tracing::info!(visitor_id = %id, "visitor checked out");
  Ok(Json(visitor))
}
