//! JSON REST API for the estate visitor backend.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`VisitorStore`] and [`GroupStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", estate_api::api_router(ApiState::new(store, policy)))
//! ```

pub mod error;
pub mod groups;
pub mod visitors;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use estate_core::{
  service::VisitorService,
  store::{GroupStore, VisitorStore},
  visitor::TransitionPolicy,
};

pub use error::ApiError;

/// Shared state threaded through the API handlers.
pub struct ApiState<S> {
  pub visitors: VisitorService<S>,
  pub store:    Arc<S>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { visitors: self.visitors.clone(), store: Arc::clone(&self.store) }
  }
}

impl<S: VisitorStore> ApiState<S> {
  pub fn new(store: Arc<S>, policy: TransitionPolicy) -> Self {
    Self {
      visitors: VisitorService::with_policy(Arc::clone(&store), policy),
      store,
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested under a parent router once the
/// parent's own state has been applied.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: VisitorStore + GroupStore + 'static,
{
  Router::new()
    // Visitors
    .route("/visitors", get(visitors::list::<S>).post(visitors::preapprove::<S>))
    .route("/visitors/pending", get(visitors::pending::<S>))
    .route("/visitors/{id}", get(visitors::get_one::<S>))
    .route("/visitors/{id}/approve", post(visitors::approve::<S>))
    .route("/visitors/{id}/reject", post(visitors::reject::<S>))
    .route("/visitors/{id}/check-in", post(visitors::check_in::<S>))
    .route("/visitors/{id}/check-out", post(visitors::check_out::<S>))
    .route("/residents/{id}/visitors", get(visitors::by_resident::<S>))
    // Groups
    .route("/groups", get(groups::list::<S>))
    .route("/groups/{id}", get(groups::get_one::<S>))
    .with_state(state)
}
