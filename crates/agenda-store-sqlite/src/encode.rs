//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates and times use fixed-width ISO 8601 text so that lexical order in
//! `ORDER BY date, time` matches chronological order, and so that equal
//! values always encode identically (the uniqueness constraint compares
//! text).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use agenda_core::appointment::{Appointment, AppointmentId};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveTime ───────────────────────────────────────────────────────────────

pub fn encode_time(t: NaiveTime) -> String { t.format(TIME_FORMAT).to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAppointment::from_row`].
pub const APPOINTMENT_COLUMNS: &str = "id, name, service, date, time, created_at";

/// Raw values read directly from an `appointments` row.
pub struct RawAppointment {
  pub id:         i64,
  pub name:       String,
  pub service:    String,
  pub date:       String,
  pub time:       String,
  pub created_at: String,
}

impl RawAppointment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      service:    row.get(2)?,
      date:       row.get(3)?,
      time:       row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_appointment(self) -> Result<Appointment> {
    Ok(Appointment {
      id:         AppointmentId(self.id),
      name:       self.name,
      service:    self.service,
      date:       decode_date(&self.date)?,
      time:       decode_time(&self.time)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
