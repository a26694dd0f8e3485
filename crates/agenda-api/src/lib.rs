//! JSON REST API for Agenda.
//!
//! Exposes an axum [`Router`] backed by any
//! [`agenda_core::store::AppointmentStore`]. Bookings go through the
//! [`BookingEngine`]; reads and deletes go straight to the store.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = agenda_api::router(AppState::new(engine), &config.allowed_origins);
//! ```

pub mod appointments;
pub mod cors;
pub mod error;

use std::{path::PathBuf, sync::Arc};

use agenda_core::{booking::BookingEngine, rules::Policy, store::AppointmentStore};
use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Path under which [`router`] mounts the API.
pub const API_PREFIX: &str = "/api";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AGENDA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Origins allowed by CORS. Entries may use a `*.` wildcard for the
  /// leftmost host label, e.g. `https://*.example.app`.
  #[serde(default)]
  pub allowed_origins: Vec<String>,
  #[serde(default)]
  pub policy:          Policy,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub engine: BookingEngine<S>,
}

impl<S: AppointmentStore> AppState<S> {
  pub fn new(engine: BookingEngine<S>) -> Self {
    Self { store: Arc::clone(engine.store()), engine }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      engine: self.engine.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the appointment routes for `state`, without any prefix or layers.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: AppointmentStore + 'static,
{
  Router::new()
    .route(
      "/appointments",
      get(appointments::list::<S>).post(appointments::create::<S>),
    )
    .route(
      "/appointments/{id}",
      get(appointments::get_one::<S>).delete(appointments::delete_one::<S>),
    )
    .with_state(state)
}

/// The full application: API under [`API_PREFIX`], request tracing, and CORS
/// for `allowed_origins`.
pub fn router<S>(state: AppState<S>, allowed_origins: &[String]) -> Router
where
  S: AppointmentStore + 'static,
{
  Router::new()
    .nest(API_PREFIX, api_router(state))
    .layer(cors::layer(allowed_origins))
    .layer(TraceLayer::new_for_http())
}
