//! HTTP server for the estate visitor backend.
//!
//! Serves the form-encoded group registration endpoint at `/registerGroup`
//! and nests the JSON API from `estate-api` under `/api`.

pub mod error;
pub mod registration;

pub use error::Error;

use std::sync::Arc;

use axum::{Router, routing::post};
use estate_api::ApiState;
use estate_core::{
  store::{GroupStore, VisitorStore},
  visitor::TransitionPolicy,
};
use estate_store_sqlite::StoreConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ESTATE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// Read from the top-level `store_path` and `store_busy_timeout_ms` keys.
  #[serde(flatten)]
  pub store:             StoreConfig,
  /// `unguarded` or `pending_only`.
  #[serde(default)]
  pub transition_policy: TransitionPolicy,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server's own handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: VisitorStore + GroupStore + 'static,
{
  let api = estate_api::api_router(ApiState::new(
    Arc::clone(&state.store),
    state.config.transition_policy,
  ));

  Router::new()
    .route("/registerGroup", post(registration::handler::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use estate_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const BOOK_CLUB: &str =
    "groupName=Book+Club&purpose=Meeting&visitDate=2024-05-01&hostId=42&members=Alice%2CBob";

  async fn make_state(policy: TransitionPolicy) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:              "127.0.0.1".to_string(),
        port:              8080,
        store:             StoreConfig::new(":memory:"),
        transition_policy: policy,
      }),
    }
  }

  async fn oneshot(
    state:        AppState<SqliteStore>,
    method:       &str,
    uri:          &str,
    content_type: Option<&str>,
    body:         String,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
      builder = builder.header(header::CONTENT_TYPE, ct);
    }
    let req = builder.body(Body::from(body)).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn post_form(state: AppState<SqliteStore>, body: &str) -> Response {
    oneshot(
      state,
      "POST",
      "/registerGroup",
      Some("application/x-www-form-urlencoded"),
      body.to_string(),
    )
    .await
  }

  async fn post_json(state: AppState<SqliteStore>, uri: &str, body: Value) -> Response {
    oneshot(state, "POST", uri, Some("application/json"), body.to_string()).await
  }

  async fn get(state: AppState<SqliteStore>, uri: &str) -> Response {
    oneshot(state, "GET", uri, None, String::new()).await
  }

  async fn text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn jane() -> Value {
    json!({
      "resident_id": 7,
      "full_name":   "Jane Doe",
      "visit_date":  "2024-05-01",
      "status":      "Approved",
    })
  }

  // ── /registerGroup ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_group_succeeds_and_stores_fields() {
    let state = make_state(TransitionPolicy::Unguarded).await;

    let resp = post_form(state.clone(), BOOK_CLUB).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "Group registered successfully!");

    let groups = json_body(get(state, "/api/groups").await).await;
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["group_name"], "Book Club");
    assert_eq!(groups[0]["purpose"], "Meeting");
    assert_eq!(groups[0]["visit_date"], "2024-05-01");
    assert_eq!(groups[0]["host_id"], "42");
    assert_eq!(groups[0]["members"], "Alice,Bob");
  }

  #[tokio::test]
  async fn register_group_trims_whitespace() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let body = "groupName=++Book+Club++&purpose=+Meeting&visitDate=2024-05-01+\
                &hostId=%0942&members=Alice%2CBob";

    let resp = post_form(state.clone(), body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let group = json_body(get(state, "/api/groups/1").await).await;
    assert_eq!(group["group_name"], "Book Club");
    assert_eq!(group["purpose"], "Meeting");
    assert_eq!(group["visit_date"], "2024-05-01");
    assert_eq!(group["host_id"], "42");
  }

  #[tokio::test]
  async fn register_group_blank_members_rejected() {
    for body in [
      "groupName=Book+Club&purpose=Meeting&visitDate=2024-05-01&hostId=42&members=",
      "groupName=Book+Club&purpose=Meeting&visitDate=2024-05-01&hostId=42&members=+++",
      "groupName=Book+Club&purpose=Meeting&visitDate=2024-05-01&hostId=42",
    ] {
      let state = make_state(TransitionPolicy::Unguarded).await;
      let resp = post_form(state.clone(), body).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
      assert_eq!(text(resp).await, "All fields are required!");

      let groups = json_body(get(state, "/api/groups").await).await;
      assert_eq!(groups, json!([]));
    }
  }

  #[tokio::test]
  async fn unknown_group_is_404() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let resp = get(state, "/api/groups/12").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── visitor lifecycle over /api ─────────────────────────────────────────────

  #[tokio::test]
  async fn preapprove_forces_pending() {
    let state = make_state(TransitionPolicy::Unguarded).await;

    let resp = post_json(state.clone(), "/api/visitors", jane()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let visitor = json_body(resp).await;
    assert_eq!(visitor["status"], "Pending");
    assert_eq!(visitor["full_name"], "Jane Doe");

    let pending = json_body(get(state, "/api/visitors/pending").await).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["visitor_id"], visitor["visitor_id"]);
  }

  #[tokio::test]
  async fn approve_then_get_is_approved() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let created = json_body(post_json(state.clone(), "/api/visitors", jane()).await).await;
    let id = created["visitor_id"].as_i64().unwrap();

    let resp = post_json(state.clone(), &format!("/api/visitors/{id}/approve"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "Approved");

    let fetched = json_body(get(state.clone(), &format!("/api/visitors/{id}")).await).await;
    assert_eq!(fetched["status"], "Approved");

    let pending = json_body(get(state, "/api/visitors/pending").await).await;
    assert_eq!(pending, json!([]));
  }

  #[tokio::test]
  async fn reject_twice_succeeds() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let created = json_body(post_json(state.clone(), "/api/visitors", jane()).await).await;
    let id = created["visitor_id"].as_i64().unwrap();
    let uri = format!("/api/visitors/{id}/reject");

    for _ in 0..2 {
      let resp = post_json(state.clone(), &uri, json!({})).await;
      assert_eq!(resp.status(), StatusCode::OK);
      assert_eq!(json_body(resp).await["status"], "Rejected");
    }
  }

  #[tokio::test]
  async fn approve_unknown_visitor_is_404() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let resp = post_json(state.clone(), "/api/visitors/999/approve", json!({})).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("999"), "{body}");

    let all = json_body(get(state, "/api/visitors").await).await;
    assert_eq!(all, json!([]));
  }

  #[tokio::test]
  async fn pending_only_policy_returns_conflict() {
    let state = make_state(TransitionPolicy::PendingOnly).await;
    let created = json_body(post_json(state.clone(), "/api/visitors", jane()).await).await;
    let id = created["visitor_id"].as_i64().unwrap();

    post_json(state.clone(), &format!("/api/visitors/{id}/approve"), json!({})).await;
    let resp = post_json(state.clone(), &format!("/api/visitors/{id}/reject"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let fetched = json_body(get(state, &format!("/api/visitors/{id}")).await).await;
    assert_eq!(fetched["status"], "Approved");
  }

  #[tokio::test]
  async fn list_filters_by_status_and_resident() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let a = json_body(post_json(state.clone(), "/api/visitors", jane()).await).await;
    let mut other = jane();
    other["resident_id"] = json!(8);
    post_json(state.clone(), "/api/visitors", other).await;
    let id = a["visitor_id"].as_i64().unwrap();
    post_json(state.clone(), &format!("/api/visitors/{id}/approve"), json!({})).await;

    let approved = json_body(get(state.clone(), "/api/visitors?status=Approved").await).await;
    assert_eq!(approved.as_array().unwrap().len(), 1);
    assert_eq!(approved[0]["visitor_id"], id);

    let theirs = json_body(get(state.clone(), "/api/visitors?resident_id=8").await).await;
    assert_eq!(theirs.as_array().unwrap().len(), 1);
    assert_eq!(theirs[0]["resident_id"], 8);

    let hosted = json_body(get(state.clone(), "/api/residents/7/visitors").await).await;
    assert_eq!(hosted.as_array().unwrap().len(), 1);

    let both = json_body(
      get(state.clone(), "/api/visitors?status=Pending&resident_id=7").await,
    )
    .await;
    assert_eq!(both, json!([]));

    let all = json_body(get(state, "/api/visitors").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn status_filter_is_case_sensitive() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let resp = get(state, "/api/visitors?status=pending").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn preapprove_blank_name_is_400() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let mut body = jane();
    body["full_name"] = json!("   ");
    let resp = post_json(state.clone(), "/api/visitors", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let all = json_body(get(state, "/api/visitors").await).await;
    assert_eq!(all, json!([]));
  }

  #[tokio::test]
  async fn preapprove_ignores_any_supplied_status() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    for supplied in ["approved", "Checked-In", "Rejected"] {
      let mut body = jane();
      body["status"] = json!(supplied);
      let resp = post_json(state.clone(), "/api/visitors", body).await;
      assert_eq!(resp.status(), StatusCode::CREATED, "status {supplied:?}");
      assert_eq!(json_body(resp).await["status"], "Pending");
    }
  }

  #[tokio::test]
  async fn malformed_visitor_body_is_a_json_400() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let resp = post_json(state, "/api/visitors", json!({ "full_name": "Jane" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["error"].is_string(), "{body}");
  }

  // ── registration bodies that are not a readable form ───────────────────────

  #[tokio::test]
  async fn register_group_without_form_content_type_is_missing_fields() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let resp = oneshot(state.clone(), "POST", "/registerGroup", None, BOOK_CLUB.into()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text(resp).await, "All fields are required!");

    let groups = json_body(get(state, "/api/groups").await).await;
    assert_eq!(groups, json!([]));
  }

  #[tokio::test]
  async fn register_group_repeated_field_is_missing_fields() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let body = format!("{BOOK_CLUB}&members=Carol");
    let resp = post_form(state, &body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text(resp).await, "All fields are required!");
  }

  // ── gate ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn gate_admits_only_approved_visitors_once() {
    let state = make_state(TransitionPolicy::Unguarded).await;
    let created = json_body(post_json(state.clone(), "/api/visitors", jane()).await).await;
    let id = created["visitor_id"].as_i64().unwrap();
    let check_in = format!("/api/visitors/{id}/check-in");
    let check_out = format!("/api/visitors/{id}/check-out");

    let resp = post_json(state.clone(), &check_in, json!({})).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    post_json(state.clone(), &format!("/api/visitors/{id}/approve"), json!({})).await;
    let resp = post_json(state.clone(), &check_in, json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(json_body(resp).await["check_in_time"].is_string());

    let resp = post_json(state.clone(), &check_in, json!({})).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = post_json(state.clone(), &check_out, json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let left = json_body(resp).await;
    assert!(left["check_out_time"].is_string());
    assert_eq!(left["status"], "Approved");

    let resp = post_json(state.clone(), &check_out, json!({})).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = post_json(state, "/api/visitors/999/check-in", json!({})).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── configuration ───────────────────────────────────────────────────────────

  #[test]
  fn config_reads_flat_store_keys() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("host", "0.0.0.0")
      .unwrap()
      .set_override("port", 9000)
      .unwrap()
      .set_override("store_path", "/var/lib/estate.db")
      .unwrap()
      .set_override("transition_policy", "pending_only")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.store.path, std::path::Path::new("/var/lib/estate.db"));
    assert_eq!(cfg.store.busy_timeout_ms, 5_000);
    assert_eq!(cfg.transition_policy, TransitionPolicy::PendingOnly);

    let tuned: ServerConfig = config::Config::builder()
      .set_override("host", "0.0.0.0")
      .unwrap()
      .set_override("port", 9000)
      .unwrap()
      .set_override("store_path", "estate.db")
      .unwrap()
      .set_override("store_busy_timeout_ms", 250)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(tuned.store.busy_timeout(), std::time::Duration::from_millis(250));
    assert_eq!(tuned.transition_policy, TransitionPolicy::Unguarded);
  }
}
