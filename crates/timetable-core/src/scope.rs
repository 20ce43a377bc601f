//! Termination scopes and computed entry status.
//!
//! Entries are never deleted. A termination narrows the validity window of a
//! single row according to a [`Scope`]; the status of any row at a given
//! instant is derived from its window at read time.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  entry::{TimetableEntry, check_instant, start_of_day},
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Which portion of a lineage's window a termination removes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Scope {
  /// Close the lineage as of the current instant.
  #[default]
  Today,
  /// Remove every occurrence on or before the occurrence date. Everything
  /// from the original `valid_from` through that day is erased, not only the
  /// targeted occurrence.
  Past,
  /// Remove every occurrence on or after the occurrence date.
  Future,
}

impl Scope {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Today => "today",
      Self::Past => "past",
      Self::Future => "future",
    }
  }

  /// Compute the row that results from terminating `entry` with this scope.
  ///
  /// | scope    | effect                              |
  /// |----------|-------------------------------------|
  /// | `today`  | `valid_to := now`                   |
  /// | `future` | `valid_to := start_of_day(occ)`     |
  /// | `past`   | `valid_from := start_of_day(occ)+1d`|
  ///
  /// Windows only ever narrow; see [`TimetableEntry::close_at`] and
  /// [`TimetableEntry::open_from`]. Fails without touching `entry` when the
  /// computed boundary falls outside the storable years.
  pub fn apply(
    self,
    entry: &TimetableEntry,
    occurrence: DateTime<Utc>,
    now: DateTime<Utc>,
  ) -> Result<TimetableEntry> {
    let day = start_of_day(occurrence);
    let mut next = entry.clone();
    match self {
      Self::Today => next.close_at(check_instant(now)?),
      Self::Future => next.close_at(check_instant(day)?),
      Self::Past => {
        let after = day
          .checked_add_signed(Duration::days(1))
          .ok_or(Error::InstantOutOfRange(day))?;
        next.open_from(check_instant(after)?);
      }
    }
    Ok(next)
  }
}

impl FromStr for Scope {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "today" => Ok(Self::Today),
      "past" => Ok(Self::Past),
      "future" => Ok(Self::Future),
      other => Err(Error::UnknownScope(other.to_owned())),
    }
  }
}

impl TryFrom<String> for Scope {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Computed status ─────────────────────────────────────────────────────────

/// The status of an entry at an instant, computed from its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
  /// `valid_from` lies after the instant.
  Scheduled { from: DateTime<Utc> },
  Active,
  Closed { at: DateTime<Utc> },
}

impl EntryStatus {
  pub fn of(entry: &TimetableEntry, at: DateTime<Utc>) -> Self {
    match entry.valid_to {
      Some(to) if to <= at => Self::Closed { at: to },
      _ if entry.valid_from > at => Self::Scheduled { from: entry.valid_from },
      _ => Self::Active,
    }
  }

  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

/// An entry bundled with its status at some instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntry {
  pub entry:  TimetableEntry,
  pub status: EntryStatus,
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone as _, Timelike as _};
  use uuid::Uuid;

  use super::*;
  use crate::entry::{TimeOfDay, Weekday};

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
  }

  fn open_entry(from: DateTime<Utc>) -> TimetableEntry {
    TimetableEntry {
      entry_id:   Uuid::new_v4(),
      subject_id: Uuid::new_v4(),
      weekday:    Weekday::MONDAY,
      start:      TimeOfDay::parse("08:00").unwrap(),
      end:        TimeOfDay::parse("09:00").unwrap(),
      valid_from: from,
      valid_to:   None,
      created_by: "admin".into(),
    }
  }

  #[test]
  fn default_scope_is_today() {
    assert_eq!(Scope::default(), Scope::Today);
  }

  #[test]
  fn scope_parses_and_serialises_lowercase() {
    assert_eq!("future".parse::<Scope>().unwrap(), Scope::Future);
    assert!(matches!(
      "tomorrow".parse::<Scope>(),
      Err(Error::UnknownScope(ref s)) if s == "tomorrow"
    ));
    assert_eq!(
      serde_json::to_value(Scope::Past).unwrap(),
      serde_json::json!("past")
    );
  }

  #[test]
  fn today_closes_at_now() {
    let e = open_entry(at(2024, 1, 1));
    let now = Utc.with_ymd_and_hms(2024, 2, 10, 13, 30, 0).unwrap();
    let next = Scope::Today.apply(&e, at(2024, 5, 5), now).unwrap();
    assert_eq!(next.valid_to, Some(now));
    assert_eq!(next.valid_from, e.valid_from);
    assert_eq!(next.entry_id, e.entry_id);
  }

  #[test]
  fn future_closes_at_start_of_occurrence_day() {
    let e = open_entry(at(2024, 1, 1));
    let occurrence = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let next = Scope::Future.apply(&e, occurrence, at(2024, 2, 1)).unwrap();
    assert_eq!(next.valid_to, Some(at(2024, 3, 1)));
    assert!(next.is_active_at(at(2024, 2, 29).with_hour(23).unwrap()));
    assert!(!next.is_active_at(at(2024, 3, 1)));
  }

  #[test]
  fn past_moves_start_past_occurrence_day() {
    let e = open_entry(at(2024, 1, 1));
    let occurrence = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
    let next = Scope::Past.apply(&e, occurrence, at(2024, 3, 4)).unwrap();
    assert_eq!(next.valid_from, at(2024, 3, 5));
    assert_eq!(next.valid_to, None);
    // Every earlier week is gone, not just the targeted occurrence.
    assert!(!next.is_active_at(at(2024, 1, 8)));
    assert!(next.is_active_at(at(2024, 3, 5)));
  }

  #[test]
  fn past_respects_existing_close() {
    let mut e = open_entry(at(2024, 1, 1));
    e.valid_to = Some(at(2024, 2, 1));
    let next = Scope::Past.apply(&e, at(2024, 3, 1), at(2024, 3, 1)).unwrap();
    assert_eq!(next.valid_from, at(2024, 2, 1));
    assert_eq!(next.valid_to, Some(at(2024, 2, 1)));
    assert!(!next.is_active_at(at(2024, 2, 1)));
  }

  #[test]
  fn future_before_valid_from_yields_empty_window() {
    let e = open_entry(at(2024, 6, 1));
    let next = Scope::Future.apply(&e, at(2024, 3, 1), at(2024, 3, 1)).unwrap();
    assert_eq!(next.valid_to, Some(next.valid_from));
  }

  #[test]
  fn past_on_last_storable_day_is_rejected() {
    let e = open_entry(at(2024, 1, 1));
    let err = Scope::Past
      .apply(&e, at(9999, 12, 31), at(2024, 3, 1))
      .unwrap_err();
    assert!(matches!(err, Error::InstantOutOfRange(_)));
    assert!(err.is_validation());
  }

  #[test]
  fn past_at_latest_representable_instant_does_not_overflow() {
    let e = open_entry(at(2024, 1, 1));
    let err = Scope::Past
      .apply(&e, DateTime::<Utc>::MAX_UTC, at(2024, 3, 1))
      .unwrap_err();
    assert!(matches!(err, Error::InstantOutOfRange(_)));
  }

  #[test]
  fn future_beyond_storable_years_is_rejected() {
    let e = open_entry(at(2024, 1, 1));
    assert!(Scope::Future.apply(&e, at(10000, 1, 1), at(2024, 3, 1)).is_err());
  }

  #[test]
  fn scope_deserialises_through_from_str() {
    let err = serde_json::from_value::<Scope>(serde_json::json!("forever"))
      .unwrap_err();
    assert!(err.to_string().contains("unknown termination scope"));
    assert_eq!(
      serde_json::from_value::<Scope>(serde_json::json!("today")).unwrap(),
      Scope::Today
    );
  }

  #[test]
  fn status_tracks_window() {
    let mut e = open_entry(at(2024, 1, 10));
    assert_eq!(
      EntryStatus::of(&e, at(2024, 1, 1)),
      EntryStatus::Scheduled { from: at(2024, 1, 10) }
    );
    assert!(EntryStatus::of(&e, at(2024, 1, 10)).is_active());
    e.valid_to = Some(at(2024, 3, 1));
    assert_eq!(
      EntryStatus::of(&e, at(2024, 3, 1)),
      EntryStatus::Closed { at: at(2024, 3, 1) }
    );
  }
}
