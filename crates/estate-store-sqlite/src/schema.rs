//! SQL schema for the estate SQLite store.
//!
//! Executed once at connection startup. Older files are brought forward by
//! the migrations below, selected on `PRAGMA user_version`.

/// Version 1 files predate gate presence. Run inside a transaction.
pub const MIGRATE_V1_TO_V2: &str = "
ALTER TABLE visitors ADD COLUMN check_in_time  TEXT;
ALTER TABLE visitors ADD COLUMN check_out_time TEXT;
PRAGMA user_version = 2;
";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS visitors (
    visitor_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    resident_id  INTEGER NOT NULL,
    full_name    TEXT NOT NULL,
    contact      TEXT,
    purpose      TEXT,
    visit_date   TEXT NOT NULL,   -- ISO 8601 calendar date
    status       TEXT NOT NULL DEFAULT 'Pending'
                 CHECK (status IN ('Pending', 'Approved', 'Rejected')),
    created_at   TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    check_in_time  TEXT,          -- RFC 3339 UTC; set once by the gate
    check_out_time TEXT
);

-- Group registrations are insert-only; no UPDATE is ever issued.
CREATE TABLE IF NOT EXISTS group_access (
    group_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    group_name    TEXT NOT NULL,
    purpose       TEXT NOT NULL,
    visit_date    TEXT NOT NULL,
    host_id       TEXT NOT NULL,
    members       TEXT NOT NULL,
    registered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS visitors_status_idx   ON visitors(status);
CREATE INDEX IF NOT EXISTS visitors_resident_idx ON visitors(resident_id);

PRAGMA user_version = 2;
";
