//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so SQL string comparison agrees with chronological order. Times
//! of day are stored in their canonical `HH:MM` form. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use timetable_core::entry::{TimeOfDay, TimetableEntry, Weekday};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawEntry::from_row`].
pub const ENTRY_COLUMNS: &str = "entry_id, subject_id, weekday, start_time, \
                                 end_time, valid_from, valid_to, created_by";

/// Raw values read directly from a `timetable_entries` row.
pub struct RawEntry {
  pub entry_id:   String,
  pub subject_id: String,
  pub weekday:    i64,
  pub start_time: String,
  pub end_time:   String,
  pub valid_from: String,
  pub valid_to:   Option<String>,
  pub created_by: String,
}

impl RawEntry {
  /// Read the columns selected by [`ENTRY_COLUMNS`], in order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:   row.get(0)?,
      subject_id: row.get(1)?,
      weekday:    row.get(2)?,
      start_time: row.get(3)?,
      end_time:   row.get(4)?,
      valid_from: row.get(5)?,
      valid_to:   row.get(6)?,
      created_by: row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<TimetableEntry> {
    Ok(TimetableEntry {
      entry_id:   decode_uuid(&self.entry_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      weekday:    Weekday::new(self.weekday)?,
      start:      TimeOfDay::parse(&self.start_time)?,
      end:        TimeOfDay::parse(&self.end_time)?,
      valid_from: decode_dt(&self.valid_from)?,
      valid_to:   self.valid_to.as_deref().map(decode_dt).transpose()?,
      created_by: self.created_by,
    })
  }
}
