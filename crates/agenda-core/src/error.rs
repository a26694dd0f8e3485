//! Error types for `agenda-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("opening time {opens_at} is after closing time {closes_at}")]
  InvertedOpeningHours {
    opens_at:  chrono::NaiveTime,
    closes_at: chrono::NaiveTime,
  },

  #[error("text length bounds are inverted: {min} > {max}")]
  InvertedLengthBounds { min: usize, max: usize },

  #[error("minimum lead time must not be negative, got {0} minutes")]
  NegativeLeadTime(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
