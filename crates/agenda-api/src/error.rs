//! API error type and [`axum::response::IntoResponse`] implementation.

use agenda_core::{
  booking::BookingError,
  rules::{FieldError, ValidationErrors},
};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const CONFLICT_MESSAGE: &str = "an appointment already exists for this date and time";
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid data: {0}")]
  Validation(ValidationErrors),

  /// The body could not be read as a JSON object at all.
  #[error("malformed body: {0}")]
  MalformedBody(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl<E> From<BookingError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: BookingError<E>) -> Self {
    match e {
      BookingError::Invalid(errors) => Self::Validation(errors),
      BookingError::SlotConflict { .. } => Self::Conflict(CONFLICT_MESSAGE.to_owned()),
      BookingError::Store(e) => Self::store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "message": m }))).into_response(),
      ApiError::Validation(errors) => {
        let errors: Vec<FieldError> = errors.into_inner();
        (
          StatusCode::BAD_REQUEST,
          Json(json!({ "message": "invalid data", "errors": errors })),
        )
          .into_response()
      }
      ApiError::MalformedBody(detail) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "invalid data", "errors": [], "detail": detail })),
      )
        .into_response(),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, Json(json!({ "message": m }))).into_response(),
      ApiError::Store(e) => {
        // Full detail stays in the log; clients only see a generic message.
        tracing::error!(error = ?e, "unhandled store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": INTERNAL_MESSAGE })),
        )
          .into_response()
      }
    }
  }
}
