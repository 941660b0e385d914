//! [`SqliteStore`] — the SQLite implementation of [`VisitorStore`] and
//! [`GroupStore`].

use std::time::Duration;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use estate_core::{
  group::{GroupId, GroupRegistration, NewGroupRegistration},
  store::{GroupStore, VisitorStore},
  visitor::{
    GateEvent, NewVisitor, ResidentId, Visitor, VisitorId, VisitorRecord, VisitorStatus,
  },
};

use crate::{
  Error, Result, StoreConfig,
  encode::{
    GROUP_COLUMNS, RawGroup, RawVisitor, VISITOR_COLUMNS, encode_date, encode_dt,
    encode_status,
  },
  schema::{MIGRATE_V1_TO_V2, SCHEMA},
};

/// Row selection for the visitor list queries.
enum VisitorFilter {
  All,
  Status(VisitorStatus),
  Resident(ResidentId),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An estate store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database described by `config` and run schema
  /// initialisation.
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(&config.path).await?;
    let store = Self { conn };
    store.init_schema(config.busy_timeout()).await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(Duration::ZERO).await?;
    Ok(store)
  }

  async fn init_schema(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version == 1 {
          let tx = conn.transaction()?;
          tx.execute_batch(MIGRATE_V1_TO_V2)?;
          tx.commit()?;
        }
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_visitor(&self, new: NewVisitor) -> Result<Visitor> {
    let created_at = Utc::now();

    let resident_id    = new.resident_id.0;
    let full_name      = new.full_name.clone();
    let contact        = new.contact.clone();
    let purpose        = new.purpose.clone();
    let visit_date_str = encode_date(new.visit_date);
    let status_str     = encode_status(new.status);
    let created_at_str = encode_dt(created_at);

    let rowid = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visitors (
             resident_id, full_name, contact, purpose, visit_date, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            resident_id,
            full_name,
            contact,
            purpose,
            visit_date_str,
            status_str,
            created_at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Visitor {
      visitor_id:     VisitorId(rowid),
      resident_id:    new.resident_id,
      full_name:      new.full_name,
      contact:        new.contact,
      purpose:        new.purpose,
      visit_date:     new.visit_date,
      status:         new.status,
      created_at,
      check_in_time:  None,
      check_out_time: None,
    })
  }

  /// Set one column of one visitor and read the row again in a single
  /// transaction. `column` is never caller-supplied text.
  async fn update_column(
    &self,
    id: VisitorId,
    column: &'static str,
    value: String,
  ) -> Result<Visitor> {
    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          &format!("UPDATE visitors SET {column} = ?1 WHERE visitor_id = ?2"),
          rusqlite::params![value, id.0],
        )?;
        let row = if changed == 0 {
          None
        } else {
          Some(tx.query_row(
            &format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE visitor_id = ?1"),
            rusqlite::params![id.0],
            RawVisitor::from_row,
          )?)
        };
        tx.commit()?;
        Ok(row)
      })
      .await?;

    raw
      .ok_or(Error::Core(estate_core::Error::VisitorNotFound(id)))?
      .into_visitor()
  }

  async fn select_visitors(&self, filter: VisitorFilter) -> Result<Vec<Visitor>> {
    let (clause, param) = match filter {
      VisitorFilter::All => ("", None),
      VisitorFilter::Status(s) => {
        ("WHERE status = ?1", Some(Value::from(encode_status(s).to_owned())))
      }
      VisitorFilter::Resident(r) => ("WHERE resident_id = ?1", Some(Value::from(r.0))),
    };

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {VISITOR_COLUMNS} FROM visitors {clause}
           ORDER BY visit_date DESC, visitor_id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(param), RawVisitor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitor::into_visitor).collect()
  }
}

// ─── VisitorStore impl ───────────────────────────────────────────────────────

impl VisitorStore for SqliteStore {
  type Error = Error;

  async fn save(&self, record: VisitorRecord) -> Result<Visitor> {
    match record {
      VisitorRecord::New(new) => self.insert_visitor(new).await,
      VisitorRecord::Stored(visitor) => {
        let status = encode_status(visitor.status).to_owned();
        self.update_column(visitor.visitor_id, "status", status).await
      }
    }
  }

  async fn find_by_id(&self, id: VisitorId) -> Result<Option<Visitor>> {
    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE visitor_id = ?1"),
            rusqlite::params![id.0],
            RawVisitor::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVisitor::into_visitor).transpose()
  }

  async fn find_by_status(&self, status: VisitorStatus) -> Result<Vec<Visitor>> {
    self.select_visitors(VisitorFilter::Status(status)).await
  }

  async fn find_by_resident_id(&self, resident_id: ResidentId) -> Result<Vec<Visitor>> {
    self.select_visitors(VisitorFilter::Resident(resident_id)).await
  }

  async fn list_visitors(&self) -> Result<Vec<Visitor>> {
    self.select_visitors(VisitorFilter::All).await
  }

  async fn record_gate_event(&self, id: VisitorId, event: GateEvent) -> Result<Visitor> {
    let column = match event {
      GateEvent::CheckIn => "check_in_time",
      GateEvent::CheckOut => "check_out_time",
    };
    self.update_column(id, column, encode_dt(Utc::now())).await
  }
}

// ─── GroupStore impl ─────────────────────────────────────────────────────────

impl GroupStore for SqliteStore {
  type Error = Error;

  async fn insert_group(
    &self,
    group: NewGroupRegistration,
  ) -> Result<Option<GroupRegistration>> {
    let registered_at = Utc::now();
    let at_str        = encode_dt(registered_at);
    let row           = group.clone();

    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO group_access (
             group_name, purpose, visit_date, host_id, members, registered_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            row.group_name,
            row.purpose,
            row.visit_date,
            row.host_id,
            row.members,
            at_str,
          ],
        )?;
        Ok((changed > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(inserted.map(|rowid| GroupRegistration {
      group_id:      GroupId(rowid),
      group_name:    group.group_name,
      purpose:       group.purpose,
      visit_date:    group.visit_date,
      host_id:       group.host_id,
      members:       group.members,
      registered_at,
    }))
  }

  async fn find_group(&self, id: GroupId) -> Result<Option<GroupRegistration>> {
    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {GROUP_COLUMNS} FROM group_access WHERE group_id = ?1"),
            rusqlite::params![id.0],
            RawGroup::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn list_groups(&self) -> Result<Vec<GroupRegistration>> {
    let raws: Vec<RawGroup> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GROUP_COLUMNS} FROM group_access ORDER BY group_id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawGroup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }
}
