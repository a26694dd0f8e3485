//! Core types and booking rules for the Agenda appointment service.
//!
//! This crate has no HTTP or database dependencies; all other crates
//! depend on it. Storage backends implement
//! [`store::AppointmentStore`]; the [`booking::BookingEngine`] is the only
//! path through which an appointment may be created.

// Store impls use `async fn`; the trait spells out the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod appointment;
pub mod booking;
pub mod clock;
pub mod conflict;
pub mod error;
pub mod memory;
pub mod rules;
pub mod store;

pub use error::{Error, Result};
