//! Read-back handlers for group registrations.
//!
//! Registrations are created through the form endpoint served by
//! `estate-server`; this module only lists and fetches them.

use axum::{
  Json,
  extract::{Path, State},
};
use estate_core::{
  group::{GroupId, GroupRegistration},
  store::{GroupStore, VisitorStore},
};

use crate::{ApiState, error::ApiError};

/// `GET /groups`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<GroupRegistration>>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let groups = state
    .store
    .list_groups()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(groups))
}

/// `GET /groups/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<GroupId>,
) -> Result<Json<GroupRegistration>, ApiError>
where
  S: VisitorStore + GroupStore + 'static,
{
  let group = state
    .store
    .find_group(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(estate_core::Error::GroupNotFound(id))?;
  Ok(Json(group))
}
