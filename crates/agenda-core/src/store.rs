//! The `AppointmentStore` trait and its outcome types.
//!
//! The trait is implemented by storage backends (e.g. `agenda-store-sqlite`).
//! Higher layers (`agenda-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{NaiveDate, NaiveTime};

use crate::appointment::{Appointment, AppointmentId, NewAppointment};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of [`AppointmentStore::insert_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
  /// The record was persisted and assigned an identifier.
  Inserted(Appointment),
  /// Another record already occupies the `(date, time)` slot.
  SlotTaken,
}

/// Result of [`AppointmentStore::delete_by_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
  Deleted,
  NotFound,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an appointment store backend.
///
/// Implementations must guarantee that no two stored appointments share a
/// `(date, time)` pair, even under concurrent writers. That guarantee lives
/// in [`insert_if_absent`](Self::insert_if_absent) and is the only mutual
/// exclusion the booking path relies on.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AppointmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Atomically persist `new` unless its slot is already occupied.
  ///
  /// A collision must be reported as [`Insertion::SlotTaken`], never as an
  /// error, and never by inserting a second row.
  fn insert_if_absent(
    &self,
    new: NewAppointment,
  ) -> impl Future<Output = Result<Insertion, Self::Error>> + Send + '_;

  /// Remove an appointment by identifier.
  fn delete_by_id(
    &self,
    id: AppointmentId,
  ) -> impl Future<Output = Result<Deletion, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Whether an appointment exists at exactly `date` and `time`.
  fn exists_at(
    &self,
    date: NaiveDate,
    time: NaiveTime,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve an appointment by identifier. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: AppointmentId,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  /// All appointments, ordered by date then time, ascending.
  fn list_all(&self) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;
}
