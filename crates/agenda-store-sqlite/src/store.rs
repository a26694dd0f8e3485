//! [`SqliteStore`]: the SQLite implementation of [`AppointmentStore`].

use std::path::Path;

use agenda_core::{
  appointment::{Appointment, AppointmentId, NewAppointment},
  store::{AppointmentStore, Deletion, Insertion},
};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{APPOINTMENT_COLUMNS, RawAppointment, encode_date, encode_dt, encode_time},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An appointment store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Whether `err` is a violation of a `UNIQUE` constraint. The `appointments`
/// table has exactly one, over `(date, time)`.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── AppointmentStore impl ───────────────────────────────────────────────────

impl AppointmentStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_if_absent(&self, new: NewAppointment) -> Result<Insertion> {
    let name           = new.name.clone();
    let service        = new.service.clone();
    let date_str       = encode_date(new.date);
    let time_str       = encode_time(new.time);
    let created_at_str = encode_dt(new.created_at);

    let row_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO appointments (name, service, date, time, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![name, service, date_str, time_str, created_at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(match row_id {
      Some(id) => Insertion::Inserted(Appointment::from_new(AppointmentId(id), new)),
      None     => Insertion::SlotTaken,
    })
  }

  async fn delete_by_id(&self, id: AppointmentId) -> Result<Deletion> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM appointments WHERE id = ?1",
          rusqlite::params![id.0],
        )?)
      })
      .await?;

    Ok(if removed == 0 { Deletion::NotFound } else { Deletion::Deleted })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn exists_at(&self, date: NaiveDate, time: NaiveTime) -> Result<bool> {
    let date_str = encode_date(date);
    let time_str = encode_time(time);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM appointments WHERE date = ?1 AND time = ?2)",
          rusqlite::params![date_str, time_str],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;

    Ok(exists)
  }

  async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
    let raw: Option<RawAppointment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
              rusqlite::params![id.0],
              RawAppointment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAppointment::into_appointment).transpose()
  }

  async fn list_all(&self) -> Result<Vec<Appointment>> {
    let raws: Vec<RawAppointment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date, time"
        ))?;
        let rows = stmt
          .query_map([], RawAppointment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAppointment::into_appointment).collect()
  }
}
