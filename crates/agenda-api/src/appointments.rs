//! Handlers for `/appointments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/appointments` | Ordered by date, then time |
//! | `GET`    | `/appointments/{id}` | 404 if not found |
//! | `POST`   | `/appointments` | Body: [`CreateBody`]; 201, 400, 409 |
//! | `DELETE` | `/appointments/{id}` | 204, or 404 if not found |

use agenda_core::{
  appointment::{Appointment, AppointmentId, BookingRequest},
  rules::{Field, Rule, ValidationErrors, Violation},
  store::{AppointmentStore, Deletion},
};
use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime, Timelike as _};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{API_PREFIX, AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /appointments`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: AppointmentStore + 'static,
{
  let appointments = state.store.list_all().await.map_err(ApiError::store)?;
  info!(count = appointments.len(), "listed appointments");
  Ok(Json(appointments))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /appointments/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError>
where
  S: AppointmentStore + 'static,
{
  let id = AppointmentId(id);
  let appointment = state
    .store
    .find_by_id(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      warn!(%id, "appointment not found");
      not_found(id)
    })?;
  Ok(Json(appointment))
}

// ─── Create ───────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_MESSAGE: &str = "date must be formatted as YYYY-MM-DD";
const TIME_MESSAGE: &str = "time must be formatted as HH:MM or HH:MM:SS";

/// JSON body accepted by `POST /appointments`.
///
/// Fields are kept as raw JSON so that a value of the wrong type or shape is
/// reported against its field instead of rejecting the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub name:    Option<Value>,
  pub service: Option<Value>,
  /// `YYYY-MM-DD`
  pub date:    Option<Value>,
  /// `HH:MM` or `HH:MM:SS`
  pub time:    Option<Value>,
}

fn parse_date(s: &str) -> Result<NaiveDate, Violation> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .map_err(|_| Violation::new(Rule::Format, DATE_MESSAGE))
}

fn parse_time(s: &str) -> Result<NaiveTime, Violation> {
  let s = s.trim();
  let time = NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|_| Violation::new(Rule::Format, TIME_MESSAGE))?;
  // chrono admits second 60 as a leap second; a wall-clock slot never has one.
  if time.nanosecond() >= 1_000_000_000 {
    return Err(Violation::new(Rule::Format, TIME_MESSAGE));
  }
  Ok(time)
}

/// Take a JSON string out of `value`. `null` and absent both read as `None`;
/// any other type is a format error on `field`.
fn text(
  value: Option<Value>,
  field: Field,
  message: &str,
  errors: &mut ValidationErrors,
) -> Option<String> {
  match value {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) => Some(s),
    Some(_) => {
      errors.push(field, Violation::new(Rule::Format, message));
      None
    }
  }
}

impl CreateBody {
  /// Decode into a [`BookingRequest`]. Blank date/time strings count as
  /// absent; anything else that fails to decode is a format error.
  pub fn into_request(self) -> Result<BookingRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = text(self.name, Field::Name, "name must be a string", &mut errors);
    let service = text(self.service, Field::Service, "service must be a string", &mut errors);
    let date = text(self.date, Field::Date, DATE_MESSAGE, &mut errors)
      .filter(|s| !s.trim().is_empty())
      .and_then(|s| parse_date(&s).map_err(|v| errors.push(Field::Date, v)).ok());
    let time = text(self.time, Field::Time, TIME_MESSAGE, &mut errors)
      .filter(|s| !s.trim().is_empty())
      .and_then(|s| parse_time(&s).map_err(|v| errors.push(Field::Time, v)).ok());

    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(BookingRequest { name, service, date, time })
  }
}

/// `POST /appointments`; returns 201 + the stored [`Appointment`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AppointmentStore + 'static,
{
  let Json(body) = body.map_err(|rejection| {
    warn!(error = %rejection.body_text(), "unreadable appointment body");
    ApiError::MalformedBody(rejection.body_text())
  })?;
  info!(name = ?body.name, service = ?body.service, "creating appointment");

  let request = body.into_request().map_err(|errors| {
    warn!(?errors, "malformed appointment body");
    ApiError::Validation(errors)
  })?;

  let appointment = state.engine.book(request).await?;
  let location = format!("{API_PREFIX}/appointments/{}", appointment.id);
  Ok((
    StatusCode::CREATED,
    [(header::LOCATION, location)],
    Json(appointment),
  ))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /appointments/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: AppointmentStore + 'static,
{
  let id = AppointmentId(id);
  match state.store.delete_by_id(id).await.map_err(ApiError::store)? {
    Deletion::Deleted => {
      info!(%id, "appointment deleted");
      Ok(StatusCode::NO_CONTENT)
    }
    Deletion::NotFound => {
      warn!(%id, "appointment not found for deletion");
      Err(not_found(id))
    }
  }
}

fn not_found(id: AppointmentId) -> ApiError {
  ApiError::NotFound(format!("appointment {id} not found"))
}
