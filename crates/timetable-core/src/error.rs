//! Error types for `timetable-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid time of day {0:?}: expected HH:MM")]
  InvalidTime(String),

  #[error("invalid weekday {0}: expected 0 (Sunday) through 6 (Saturday)")]
  InvalidWeekday(i64),

  #[error("invalid date range: start must be before end")]
  InvalidRange,

  #[error("instant {0} is outside the supported years 0000 to 9999")]
  InstantOutOfRange(DateTime<Utc>),

  #[error("unknown termination scope: {0:?}")]
  UnknownScope(String),

  #[error("timetable entry not found: {0}")]
  EntryNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Whether the error was caused by caller input rather than the backend.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::InvalidTime(_)
        | Self::InvalidWeekday(_)
        | Self::InvalidRange
        | Self::InstantOutOfRange(_)
        | Self::UnknownScope(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
