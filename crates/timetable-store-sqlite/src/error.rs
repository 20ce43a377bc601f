//! Error type for `timetable-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] timetable_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to save an entry whose row does not exist.
  #[error("timetable entry not found: {0}")]
  EntryNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
