//! SQLite backend for the Agenda appointment store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Slot uniqueness is enforced by a
//! `UNIQUE (date, time)` constraint on the `appointments` table.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
