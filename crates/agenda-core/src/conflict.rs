//! Slot occupancy check.
//!
//! This is an exact-match lookup, not an overlap test: appointments have no
//! duration. It gives a clear, early rejection in the common case, but two
//! concurrent callers can both see a free slot here. Only the store's
//! [`insert_if_absent`](crate::store::AppointmentStore::insert_if_absent)
//! closes that window.

use chrono::{NaiveDate, NaiveTime};

use crate::store::AppointmentStore;

/// Whether `(date, time)` is already booked.
pub async fn has_conflict<S>(store: &S, date: NaiveDate, time: NaiveTime) -> Result<bool, S::Error>
where
  S: AppointmentStore,
{
  store.exists_at(date, time).await
}
