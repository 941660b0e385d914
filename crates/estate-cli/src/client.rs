//! Async HTTP client wrapping the estate JSON API and the group form endpoint.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use estate_core::{
  group::{GroupForm, GroupRegistration},
  visitor::{GateEvent, NewVisitor, ResidentId, Visitor, VisitorId, VisitorStatus},
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Async HTTP client for the estate server.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Deserialise a JSON body, or surface the server's `{"error": ...}`.
  async fn json<T: DeserializeOwned>(what: &str, resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
      let body: serde_json::Value = resp.json().await.unwrap_or_default();
      let message = body["error"].as_str().unwrap_or("no error message");
      return Err(anyhow!("{what} → {status}: {message}"));
    }
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Visitors ──────────────────────────────────────────────────────────────

  /// `GET /api/visitors[?status=..][&resident_id=..]`
  pub async fn list_visitors(
    &self,
    status: Option<VisitorStatus>,
    resident: Option<ResidentId>,
  ) -> Result<Vec<Visitor>> {
    let mut query = Vec::new();
    if let Some(s) = status {
      query.push(("status", s.to_string()));
    }
    if let Some(r) = resident {
      query.push(("resident_id", r.to_string()));
    }
    let resp = self
      .client
      .get(self.url("/api/visitors"))
      .query(&query)
      .send()
      .await
      .context("GET /visitors failed")?;
    Self::json("GET /visitors", resp).await
  }

  /// `GET /api/visitors/pending`
  pub async fn pending(&self) -> Result<Vec<Visitor>> {
    let resp = self
      .client
      .get(self.url("/api/visitors/pending"))
      .send()
      .await
      .context("GET /visitors/pending failed")?;
    Self::json("GET /visitors/pending", resp).await
  }

  /// `GET /api/visitors/:id`
  pub async fn visitor(&self, id: VisitorId) -> Result<Visitor> {
    let resp = self
      .client
      .get(self.url(&format!("/api/visitors/{id}")))
      .send()
      .await
      .context("GET /visitors/:id failed")?;
    Self::json("GET /visitors/:id", resp).await
  }

  /// `POST /api/visitors`
  pub async fn preapprove(&self, visitor: &NewVisitor) -> Result<Visitor> {
    let resp = self
      .client
      .post(self.url("/api/visitors"))
      .json(visitor)
      .send()
      .await
      .context("POST /visitors failed")?;
    Self::json("POST /visitors", resp).await
  }

  /// `POST /api/visitors/:id/approve` or `/reject`.
  pub async fn decide(&self, id: VisitorId, status: VisitorStatus) -> Result<Visitor> {
    let action = match status {
      VisitorStatus::Approved => "approve",
      VisitorStatus::Rejected => "reject",
      VisitorStatus::Pending => return Err(anyhow!("visitors cannot be returned to Pending")),
    };
    let path = format!("/api/visitors/{id}/{action}");
    let resp = self
      .client
      .post(self.url(&path))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::json(&format!("POST {path}"), resp).await
  }

  /// `POST /api/visitors/:id/check-in` or `/check-out`.
  pub async fn gate(&self, id: VisitorId, event: GateEvent) -> Result<Visitor> {
    let path = format!("/api/visitors/{id}/{event}");
    let resp = self
      .client
      .post(self.url(&path))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::json(&format!("POST {path}"), resp).await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  /// `POST /registerGroup` — returns the server's plain-text message.
  pub async fn register_group(&self, form: &GroupForm) -> Result<String> {
    let resp = self
      .client
      .post(self.url("/registerGroup"))
      .form(form)
      .send()
      .await
      .context("POST /registerGroup failed")?;
    let status = resp.status();
    let message = resp.text().await.context("reading registration response")?;
    if status.is_success() {
      Ok(message)
    } else {
      Err(anyhow!("{status}: {message}"))
    }
  }

  /// `GET /api/groups`
  pub async fn groups(&self) -> Result<Vec<GroupRegistration>> {
    let resp = self
      .client
      .get(self.url("/api/groups"))
      .send()
      .await
      .context("GET /groups failed")?;
    Self::json("GET /groups", resp).await
  }
}
