//! Group registrations — flat records of a visiting group.
//!
//! Groups have no status and no lifecycle. A registration is validated,
//! trimmed, and inserted once; it is never updated.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, store::GroupStore};

/// Store-assigned identity of a group registration.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// The raw registration form. Any field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupForm {
  pub group_name: Option<String>,
  pub purpose:    Option<String>,
  pub visit_date: Option<String>,
  pub host_id:    Option<String>,
  pub members:    Option<String>,
}

impl GroupForm {
  /// Trim every field, failing on the first one that is absent or blank.
  ///
  /// The error names the field by its form name (e.g. `"groupName"`).
  pub fn validate(self) -> Result<NewGroupRegistration> {
    Ok(NewGroupRegistration {
      group_name: required("groupName", self.group_name)?,
      purpose:    required("purpose", self.purpose)?,
      visit_date: required("visitDate", self.visit_date)?,
      host_id:    required("hostId", self.host_id)?,
      members:    required("members", self.members)?,
    })
  }
}

fn required(name: &'static str, value: Option<String>) -> Result<String> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_owned()),
    _ => Err(Error::MissingField(name)),
  }
}

/// A validated registration ready to be inserted. All fields are trimmed
/// and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroupRegistration {
  pub group_name: String,
  pub purpose:    String,
  pub visit_date: String,
  pub host_id:    String,
  /// Free-text member list as entered, e.g. `"Alice,Bob"`.
  pub members:    String,
}

// ─── Stored ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRegistration {
  pub group_id:      GroupId,
  pub group_name:    String,
  pub purpose:       String,
  pub visit_date:    String,
  pub host_id:       String,
  pub members:       String,
  pub registered_at: DateTime<Utc>,
}

/// Outcome of a registration that passed validation and reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
  Registered(GroupRegistration),
  /// The insert completed but reported zero affected rows.
  NotInserted,
}

/// Validate `form` and insert it into `store`.
///
/// Validation failures are returned before the store is touched.
pub async fn register<S>(store: &S, form: GroupForm) -> Result<Registration>
where
  S: GroupStore,
{
  let group = form.validate()?;
  let stored = store
    .insert_group(group)
    .await
    .map_err(Into::<Error>::into)?;
  Ok(match stored {
    Some(g) => Registration::Registered(g),
    None => Registration::NotInserted,
  })
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;

  /// Records inserts in memory; can be told to affect no rows or to fail.
  #[derive(Default)]
  struct FakeGroups {
    rows:        Mutex<Vec<GroupRegistration>>,
    calls:       AtomicUsize,
    affect_none: bool,
    fail:        bool,
  }

  impl GroupStore for FakeGroups {
    type Error = Error;

    async fn insert_group(
      &self,
      group: NewGroupRegistration,
    ) -> Result<Option<GroupRegistration>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.fail {
        return Err(Error::Storage("connection refused".into()));
      }
      if self.affect_none {
        return Ok(None);
      }
      let mut rows = self.rows.lock().unwrap();
      let stored = GroupRegistration {
        group_id:      GroupId(rows.len() as i64 + 1),
        group_name:    group.group_name,
        purpose:       group.purpose,
        visit_date:    group.visit_date,
        host_id:       group.host_id,
        members:       group.members,
        registered_at: Utc::now(),
      };
      rows.push(stored.clone());
      Ok(Some(stored))
    }

    async fn find_group(&self, id: GroupId) -> Result<Option<GroupRegistration>> {
      let rows = self.rows.lock().unwrap();
      Ok(rows.iter().find(|g| g.group_id == id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<GroupRegistration>> {
      Ok(self.rows.lock().unwrap().clone())
    }
  }

  fn book_club() -> GroupForm {
    GroupForm {
      group_name: Some("Book Club".into()),
      purpose:    Some("Meeting".into()),
      visit_date: Some("2024-05-01".into()),
      host_id:    Some("42".into()),
      members:    Some("Alice,Bob".into()),
    }
  }

  #[tokio::test]
  async fn valid_form_is_stored_verbatim() {
    let store = FakeGroups::default();
    let outcome = register(&store, book_club()).await.unwrap();

    let group = match outcome {
      Registration::Registered(g) => g,
      other => panic!("expected a registration, got {other:?}"),
    };
    assert_eq!(group.group_name, "Book Club");
    assert_eq!(group.purpose, "Meeting");
    assert_eq!(group.visit_date, "2024-05-01");
    assert_eq!(group.host_id, "42");
    assert_eq!(group.members, "Alice,Bob");

    let fetched = store.find_group(group.group_id).await.unwrap();
    assert_eq!(fetched, Some(group));
  }

  #[tokio::test]
  async fn surrounding_whitespace_is_trimmed() {
    let store = FakeGroups::default();
    let mut form = book_club();
    form.group_name = Some("  Book Club\t".into());
    form.members = Some("\nAlice,Bob ".into());

    let Registration::Registered(group) = register(&store, form).await.unwrap() else {
      panic!("expected a registration");
    };
    assert_eq!(group.group_name, "Book Club");
    assert_eq!(group.members, "Alice,Bob");
  }

  #[tokio::test]
  async fn blank_members_rejected_before_storage() {
    for members in [Some(String::new()), Some("   ".into()), None] {
      let store = FakeGroups::default();
      let mut form = book_club();
      form.members = members;

      let err = register(&store, form).await.unwrap_err();
      assert!(matches!(err, Error::MissingField("members")));
      assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }
  }

  #[tokio::test]
  async fn first_missing_field_is_reported() {
    let store = FakeGroups::default();
    let err = register(&store, GroupForm::default()).await.unwrap_err();
    assert!(matches!(err, Error::MissingField("groupName")));

    let mut form = book_club();
    form.host_id = Some(" ".into());
    let err = register(&store, form).await.unwrap_err();
    assert!(matches!(err, Error::MissingField("hostId")));
  }

  #[tokio::test]
  async fn zero_rows_is_not_an_error() {
    let store = FakeGroups { affect_none: true, ..Default::default() };
    let outcome = register(&store, book_club()).await.unwrap();
    assert_eq!(outcome, Registration::NotInserted);
  }

  #[tokio::test]
  async fn storage_failure_propagates() {
    let store = FakeGroups { fail: true, ..Default::default() };
    let err = register(&store, book_club()).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
  }
}
