//! [`MemoryStore`], an in-process [`AppointmentStore`].
//!
//! Honours the same slot-uniqueness contract as the durable backends by
//! performing the occupancy check and the insert under a single lock.

use std::{
  collections::{BTreeMap, HashMap},
  convert::Infallible,
  sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{NaiveDate, NaiveTime};

use crate::{
  appointment::{Appointment, AppointmentId, NewAppointment},
  store::{AppointmentStore, Deletion, Insertion},
};

type SlotKey = (NaiveDate, NaiveTime);

#[derive(Debug, Default)]
struct Inner {
  last_id: i64,
  /// Keyed by slot, so iteration yields date-then-time order.
  by_slot: BTreeMap<SlotKey, Appointment>,
  slot_of: HashMap<AppointmentId, SlotKey>,
}

/// A volatile appointment store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of stored appointments.
  pub fn len(&self) -> usize { self.lock().by_slot.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  // No mutation below can panic halfway, so a poisoned lock still guards
  // consistent maps.
  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl AppointmentStore for MemoryStore {
  type Error = Infallible;

  async fn insert_if_absent(&self, new: NewAppointment) -> Result<Insertion, Infallible> {
    let mut inner = self.lock();
    let key = (new.date, new.time);
    if inner.by_slot.contains_key(&key) {
      return Ok(Insertion::SlotTaken);
    }

    inner.last_id += 1;
    let id = AppointmentId(inner.last_id);
    let appointment = Appointment::from_new(id, new);
    inner.slot_of.insert(id, key);
    inner.by_slot.insert(key, appointment.clone());
    Ok(Insertion::Inserted(appointment))
  }

  async fn delete_by_id(&self, id: AppointmentId) -> Result<Deletion, Infallible> {
    let mut inner = self.lock();
    match inner.slot_of.remove(&id) {
      Some(key) => {
        inner.by_slot.remove(&key);
        Ok(Deletion::Deleted)
      }
      None => Ok(Deletion::NotFound),
    }
  }

  async fn exists_at(&self, date: NaiveDate, time: NaiveTime) -> Result<bool, Infallible> {
    Ok(self.lock().by_slot.contains_key(&(date, time)))
  }

  async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, Infallible> {
    let inner = self.lock();
    Ok(
      inner
        .slot_of
        .get(&id)
        .and_then(|key| inner.by_slot.get(key))
        .cloned(),
    )
  }

  async fn list_all(&self) -> Result<Vec<Appointment>, Infallible> {
    Ok(self.lock().by_slot.values().cloned().collect())
  }
}
