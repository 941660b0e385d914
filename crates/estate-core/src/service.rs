//! The visitor lifecycle service.
//!
//! Owns no state beyond a handle to the store and the configured
//! [`TransitionPolicy`]. Every operation is a single request/response round
//! trip against the store.

use std::sync::Arc;

use crate::{
  Error, Result,
  store::VisitorStore,
  visitor::{
    GateEvent, NewVisitor, ResidentId, TransitionPolicy, Visitor, VisitorId,
    VisitorStatus,
  },
};

pub struct VisitorService<S> {
  store:  Arc<S>,
  policy: TransitionPolicy,
}

impl<S> Clone for VisitorService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: self.policy }
  }
}

impl<S: VisitorStore> VisitorService<S> {
  /// A service with the default (unguarded) transition policy.
  pub fn new(store: Arc<S>) -> Self {
    Self::with_policy(store, TransitionPolicy::default())
  }

  pub fn with_policy(store: Arc<S>, policy: TransitionPolicy) -> Self {
    Self { store, policy }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Register a visitor as `Pending`, whatever status the caller supplied.
  pub async fn preapprove(&self, visitor: NewVisitor) -> Result<Visitor> {
    let mut visitor = visitor.normalized()?;
    visitor.status = VisitorStatus::Pending;
    self.store.save(visitor.into()).await.map_err(Into::into)
  }

  pub async fn list_pending(&self) -> Result<Vec<Visitor>> {
    self
      .store
      .find_by_status(VisitorStatus::Pending)
      .await
      .map_err(Into::into)
  }

  pub async fn visitors_for_resident(
    &self,
    resident_id: ResidentId,
  ) -> Result<Vec<Visitor>> {
    self
      .store
      .find_by_resident_id(resident_id)
      .await
      .map_err(Into::into)
  }

  /// Load one visitor, failing with [`Error::VisitorNotFound`].
  pub async fn find(&self, id: VisitorId) -> Result<Visitor> {
    self
      .store
      .find_by_id(id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::VisitorNotFound(id))
  }

  pub async fn approve(&self, id: VisitorId) -> Result<Visitor> {
    self.transition(id, VisitorStatus::Approved).await
  }

  pub async fn reject(&self, id: VisitorId) -> Result<Visitor> {
    self.transition(id, VisitorStatus::Rejected).await
  }

  /// Record an approved visitor passing in through the gate.
  pub async fn check_in(&self, id: VisitorId) -> Result<Visitor> {
    self.gate(id, GateEvent::CheckIn).await
  }

  /// Record a checked-in visitor leaving.
  pub async fn check_out(&self, id: VisitorId) -> Result<Visitor> {
    self.gate(id, GateEvent::CheckOut).await
  }

  async fn gate(&self, id: VisitorId, event: GateEvent) -> Result<Visitor> {
    self.find(id).await?.check_gate(event)?;
    self
      .store
      .record_gate_event(id, event)
      .await
      .map_err(Into::into)
  }

  /// Load, check against the policy, and write back the new status.
  ///
  /// The read and the write are separate store calls; concurrent decisions
  /// on the same visitor resolve as last-write-wins.
  async fn transition(&self, id: VisitorId, to: VisitorStatus) -> Result<Visitor> {
    let mut visitor = self.find(id).await?;
    self.policy.check(id, visitor.status, to)?;
    visitor.status = to;
    self.store.save(visitor.into()).await.map_err(Into::into)
  }
}
