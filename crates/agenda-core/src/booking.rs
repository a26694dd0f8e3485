//! [`BookingEngine`], the only path through which an appointment is created.
//!
//! A booking is accepted in three steps: the request must pass every rule in
//! [`crate::rules`], the slot must look free, and the store must accept the
//! insert. The second step is a fast path only; two concurrent requests for
//! the same slot can both pass it, and the store's atomic
//! [`insert_if_absent`](AppointmentStore::insert_if_absent) decides the
//! winner. Both kinds of collision surface as [`BookingError::SlotConflict`].

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  Result,
  appointment::{Appointment, BookingRequest, NewAppointment},
  clock::Clock,
  conflict::has_conflict,
  rules::{self, Policy, ValidationErrors},
  store::{AppointmentStore, Insertion},
};

/// Why a booking was not created.
#[derive(Debug, Error)]
pub enum BookingError<E> {
  /// One or more rules failed; the store was not consulted.
  #[error(transparent)]
  Invalid(#[from] ValidationErrors),

  /// The slot is occupied, whether detected up front or at write time.
  #[error("an appointment already exists on {date} at {time}")]
  SlotConflict { date: NaiveDate, time: NaiveTime },

  /// The store failed for a reason unrelated to slot uniqueness.
  #[error("store error: {0}")]
  Store(#[source] E),
}

/// Outcome of [`BookingEngine::book`].
pub type BookingOutcome<E> = Result<Appointment, BookingError<E>>;

/// Validates and persists booking requests against a store.
///
/// Holds no lock of its own; any number of callers may share one engine.
pub struct BookingEngine<S> {
  store:  Arc<S>,
  clock:  Arc<dyn Clock>,
  policy: Policy,
}

impl<S> Clone for BookingEngine<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      clock:  Arc::clone(&self.clock),
      policy: self.policy,
    }
  }
}

impl<S: AppointmentStore> BookingEngine<S> {
  /// Build an engine after checking that `policy` is coherent.
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: Policy) -> Result<Self> {
    policy.check()?;
    Ok(Self { store, clock, policy })
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn policy(&self) -> &Policy { &self.policy }

  /// Accept or reject `request`.
  pub async fn book(&self, request: BookingRequest) -> BookingOutcome<S::Error> {
    let now = self.clock.now();
    debug!(?request, %now, "booking request received");

    let valid = match rules::validate(&request, now, &self.policy) {
      Ok(v) => v,
      Err(errors) => {
        warn!(?errors, "booking request failed validation");
        return Err(BookingError::Invalid(errors));
      }
    };
    let (date, time) = (valid.date, valid.time);

    if has_conflict(&*self.store, date, time)
      .await
      .map_err(BookingError::Store)?
    {
      warn!(%date, %time, "slot already booked");
      return Err(BookingError::SlotConflict { date, time });
    }

    let new = NewAppointment {
      name: valid.name,
      service: valid.service,
      date,
      time,
      created_at: now,
    };

    match self
      .store
      .insert_if_absent(new)
      .await
      .map_err(BookingError::Store)?
    {
      Insertion::Inserted(appointment) => {
        info!(id = %appointment.id, %date, %time, "appointment created");
        Ok(appointment)
      }
      Insertion::SlotTaken => {
        warn!(%date, %time, "slot taken by a concurrent booking");
        Err(BookingError::SlotConflict { date, time })
      }
    }
  }
}
