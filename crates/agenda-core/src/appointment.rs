//! Appointment, the booked unit, and the request that may become one.
//!
//! An appointment occupies a single point in time (a date plus a time of
//! day); there is no duration. At most one appointment may exist for any
//! `(date, time)` pair.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned surrogate key. Immutable once assigned.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<i64> for AppointmentId {
  fn from(v: i64) -> Self { Self(v) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted appointment. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub id:         AppointmentId,
  pub name:       String,
  pub service:    String,
  pub date:       NaiveDate,
  pub time:       NaiveTime,
  /// Set once, at acceptance, in UTC.
  pub created_at: DateTime<Utc>,
}

impl Appointment {
  /// Attach a store-assigned identifier to an accepted record.
  pub fn from_new(id: AppointmentId, new: NewAppointment) -> Self {
    Self {
      id,
      name: new.name,
      service: new.service,
      date: new.date,
      time: new.time,
      created_at: new.created_at,
    }
  }
}

/// An accepted booking that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
  pub name:       String,
  pub service:    String,
  pub date:       NaiveDate,
  pub time:       NaiveTime,
  pub created_at: DateTime<Utc>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Ephemeral booking input. Never persisted as-is.
///
/// Every field is optional so that a missing value is reported as a
/// "required" rule violation rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
  pub name:    Option<String>,
  pub service: Option<String>,
  pub date:    Option<NaiveDate>,
  pub time:    Option<NaiveTime>,
}

impl BookingRequest {
  /// Convenience constructor for a fully-populated request.
  pub fn new(
    name: impl Into<String>,
    service: impl Into<String>,
    date: NaiveDate,
    time: NaiveTime,
  ) -> Self {
    Self {
      name:    Some(name.into()),
      service: Some(service.into()),
      date:    Some(date),
      time:    Some(time),
    }
  }
}
