//! `POST /registerGroup` — form-encoded group registration.
//!
//! Responds with plain text. Validation failures never reach the store. A
//! body that cannot be read as a form at all (wrong content type, a field
//! given twice) is answered like any other missing field.

use axum::{
  Form,
  extract::{State, rejection::FormRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use estate_core::{
  group::{self, GroupForm, Registration},
  store::GroupStore,
};

use crate::{AppState, error::Error};

pub const REGISTERED: &str = "Group registered successfully!";

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  form: Result<Form<GroupForm>, FormRejection>,
) -> Result<Response, Error>
where
  S: GroupStore + 'static,
{
  let Form(form) = form.map_err(|rejection| {
    tracing::debug!(%rejection, "unreadable registration form");
    Error::MissingFields
  })?;
  match group::register(state.store.as_ref(), form).await? {
    Registration::Registered(g) => {
      tracing::info!(group_id = %g.group_id, host_id = %g.host_id, "group registered");
      Ok((StatusCode::OK, REGISTERED).into_response())
    }
    Registration::NotInserted => {
      tracing::warn!("group insert affected no rows");
      Err(Error::NotInserted)
    }
  }
}
