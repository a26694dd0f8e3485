//! SQL schema for the Agenda SQLite store.
//!
//! Executed on every connection open. The schema version is stamped into
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS appointments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    service     TEXT NOT NULL,
    date        TEXT NOT NULL,   -- YYYY-MM-DD
    time        TEXT NOT NULL,   -- HH:MM:SS[.fraction]
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; set at acceptance
    -- One appointment per slot. This constraint, not the application-level
    -- existence check, is what serialises concurrent bookings.
    UNIQUE (date, time)
);

PRAGMA user_version = 1;
";
