//! Timetable entries — one row per lineage of a recurring weekly slot.
//!
//! A lineage is identified by `(subject_id, weekday, start, end)`. The row
//! representing it is reused across close/reopen cycles; all temporal
//! reasoning lives in the half-open validity window `[valid_from, valid_to)`.

use std::{fmt, str::FromStr};

use chrono::{Datelike as _, DateTime, NaiveTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Instants ────────────────────────────────────────────────────────────────

/// Truncate an instant to the microsecond precision used in storage.
pub fn normalize_instant(at: DateTime<Utc>) -> DateTime<Utc> {
  at.trunc_subsecs(6)
}

/// Normalize an instant and reject it unless its year is 0000 through 9999,
/// the range the fixed-width storage encoding can order and parse.
pub fn check_instant(at: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if (0..=9999).contains(&at.year()) {
    Ok(normalize_instant(at))
  } else {
    Err(Error::InstantOutOfRange(at))
  }
}

/// Midnight UTC of the day containing `at`.
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
  at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

// ─── Weekday ─────────────────────────────────────────────────────────────────

/// Day of the week as stored: 0 = Sunday through 6 = Saturday.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Weekday(u8);

impl Weekday {
  pub const SUNDAY: Self = Self(0);
  pub const MONDAY: Self = Self(1);
  pub const TUESDAY: Self = Self(2);
  pub const WEDNESDAY: Self = Self(3);
  pub const THURSDAY: Self = Self(4);
  pub const FRIDAY: Self = Self(5);
  pub const SATURDAY: Self = Self(6);

  /// Validate a raw weekday number.
  pub fn new(value: i64) -> Result<Self> {
    match u8::try_from(value) {
      Ok(day @ 0..=6) => Ok(Self(day)),
      _ => Err(Error::InvalidWeekday(value)),
    }
  }

  pub fn number(self) -> u8 { self.0 }
}

impl TryFrom<i64> for Weekday {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> { Self::new(value) }
}

impl From<Weekday> for u8 {
  fn from(day: Weekday) -> Self { day.0 }
}

impl fmt::Display for Weekday {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── TimeOfDay ───────────────────────────────────────────────────────────────

/// A wall-clock time in strict `HH:MM` 24-hour form.
///
/// Ordering follows the clock, which is also the lexical order of the
/// canonical string form stored in the database.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
  hour:   u8,
  minute: u8,
}

impl TimeOfDay {
  pub fn new(hour: u8, minute: u8) -> Result<Self> {
    if hour > 23 || minute > 59 {
      return Err(Error::InvalidTime(format!("{hour:02}:{minute:02}")));
    }
    Ok(Self { hour, minute })
  }

  /// Parse exactly two hour digits, a colon and two minute digits.
  pub fn parse(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidTime(s.to_owned());
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
      return Err(invalid());
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
      return Err(invalid());
    }
    let [h1, h2, m1, m2] = digits.map(|d| d - b'0');
    Self::new(h1 * 10 + h2, m1 * 10 + m2).map_err(|_| invalid())
  }

  pub fn hour(self) -> u8 { self.hour }

  pub fn minute(self) -> u8 { self.minute }
}

impl FromStr for TimeOfDay {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for TimeOfDay {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<TimeOfDay> for String {
  fn from(t: TimeOfDay) -> Self { t.to_string() }
}

impl fmt::Display for TimeOfDay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:{:02}", self.hour, self.minute)
  }
}

// ─── Slot ────────────────────────────────────────────────────────────────────

/// The natural key of a lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
  pub subject_id: Uuid,
  pub weekday:    Weekday,
  pub start:      TimeOfDay,
  pub end:        TimeOfDay,
}

// ─── TimetableEntry ──────────────────────────────────────────────────────────

/// A persisted lineage row. Never hard-deleted; only its window changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
  /// Assigned at creation; stable across reactivation.
  pub entry_id:   Uuid,
  pub subject_id: Uuid,
  pub weekday:    Weekday,
  pub start:      TimeOfDay,
  pub end:        TimeOfDay,
  pub valid_from: DateTime<Utc>,
  /// `None` means open until closed.
  pub valid_to:   Option<DateTime<Utc>>,
  /// Actor that first created the row (audit only).
  pub created_by: String,
}

impl TimetableEntry {
  pub fn slot(&self) -> Slot {
    Slot {
      subject_id: self.subject_id,
      weekday:    self.weekday,
      start:      self.start,
      end:        self.end,
    }
  }

  pub fn is_open(&self) -> bool { self.valid_to.is_none() }

  /// `valid_from <= at` and (`valid_to` unset or `valid_to > at`).
  pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
    self.valid_from <= at && self.valid_to.is_none_or(|to| to > at)
  }

  /// Half-open overlap with `[range_start, range_end)`.
  pub fn overlaps(
    &self,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
  ) -> bool {
    self.valid_from < range_end
      && self.valid_to.is_none_or(|to| to > range_start)
  }

  /// Move `valid_to` earlier to `at`. Never extends the window and never
  /// crosses `valid_from`; a close before the start leaves an empty window.
  pub fn close_at(&mut self, at: DateTime<Utc>) {
    let at = at.max(self.valid_from);
    self.valid_to = Some(match self.valid_to {
      Some(current) => current.min(at),
      None => at,
    });
  }

  /// Move `valid_from` later to `at`, clamped to `valid_to` when set.
  pub fn open_from(&mut self, at: DateTime<Utc>) {
    let mut at = at.max(self.valid_from);
    if let Some(to) = self.valid_to {
      at = at.min(to);
    }
    self.valid_from = at;
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
  }

  fn entry(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> TimetableEntry {
    TimetableEntry {
      entry_id:   Uuid::new_v4(),
      subject_id: Uuid::new_v4(),
      weekday:    Weekday::MONDAY,
      start:      TimeOfDay::new(8, 0).unwrap(),
      end:        TimeOfDay::new(9, 0).unwrap(),
      valid_from: from,
      valid_to:   to,
      created_by: "tester".into(),
    }
  }

  #[test]
  fn parses_well_formed_times() {
    let t = TimeOfDay::parse("08:05").unwrap();
    assert_eq!((t.hour(), t.minute()), (8, 5));
    assert_eq!(t.to_string(), "08:05");
    assert_eq!(TimeOfDay::parse("23:59").unwrap().to_string(), "23:59");
    assert_eq!(TimeOfDay::parse("00:00").unwrap().to_string(), "00:00");
  }

  #[test]
  fn rejects_malformed_times() {
    for bad in ["8:00", "08:0", "24:00", "12:60", "12-30", "ab:cd", "", "08:00:00", " 8:00"] {
      assert!(
        matches!(TimeOfDay::parse(bad), Err(Error::InvalidTime(ref s)) if s == bad),
        "{bad:?} should be rejected"
      );
    }
  }

  #[test]
  fn times_order_by_clock() {
    let a = TimeOfDay::parse("09:30").unwrap();
    let b = TimeOfDay::parse("10:00").unwrap();
    assert!(a < b);
  }

  #[test]
  fn weekday_bounds() {
    assert_eq!(Weekday::new(0).unwrap(), Weekday::SUNDAY);
    assert_eq!(Weekday::new(6).unwrap(), Weekday::SATURDAY);
    assert!(matches!(Weekday::new(7), Err(Error::InvalidWeekday(7))));
    assert!(matches!(Weekday::new(-1), Err(Error::InvalidWeekday(-1))));
  }

  #[test]
  fn serde_uses_wire_forms() {
    let json = serde_json::to_value(TimeOfDay::parse("07:45").unwrap()).unwrap();
    assert_eq!(json, serde_json::json!("07:45"));
    assert!(serde_json::from_value::<TimeOfDay>(serde_json::json!("7:45")).is_err());
    assert_eq!(
      serde_json::from_value::<Weekday>(serde_json::json!(3)).unwrap(),
      Weekday::WEDNESDAY
    );
    assert!(serde_json::from_value::<Weekday>(serde_json::json!(9)).is_err());
  }

  #[test]
  fn active_window_is_half_open() {
    let e = entry(at(2024, 1, 10), Some(at(2024, 3, 1)));
    assert!(e.is_active_at(at(2024, 1, 10)));
    assert!(e.is_active_at(at(2024, 2, 29)));
    assert!(!e.is_active_at(at(2024, 3, 1)));
    assert!(!e.is_active_at(at(2024, 1, 9)));
  }

  #[test]
  fn overlap_examples() {
    let e = entry(at(2024, 1, 10), Some(at(2024, 3, 1)));
    assert!(e.overlaps(at(2024, 2, 1), at(2024, 2, 28)));
    assert!(e.overlaps(at(2023, 12, 1), at(2024, 1, 15)));
    assert!(!e.overlaps(at(2024, 3, 2), at(2024, 4, 1)));

    let open = entry(at(2024, 1, 10), None);
    assert!(open.overlaps(at(2030, 1, 1), at(2030, 6, 1)));
    assert!(!open.overlaps(at(2023, 1, 1), at(2024, 1, 10)));
  }

  #[test]
  fn close_never_extends_window() {
    let mut e = entry(at(2024, 1, 10), Some(at(2024, 2, 1)));
    e.close_at(at(2024, 5, 1));
    assert_eq!(e.valid_to, Some(at(2024, 2, 1)));

    e.close_at(at(2024, 1, 1));
    assert_eq!(e.valid_to, Some(at(2024, 1, 10)));
    assert!(e.valid_from <= e.valid_to.unwrap());
  }

  #[test]
  fn open_from_is_clamped_to_valid_to() {
    let mut e = entry(at(2024, 1, 10), Some(at(2024, 2, 1)));
    e.open_from(at(2024, 3, 1));
    assert_eq!(e.valid_from, at(2024, 2, 1));

    let mut e = entry(at(2024, 1, 10), None);
    e.open_from(at(2024, 1, 1));
    assert_eq!(e.valid_from, at(2024, 1, 10));
  }

  #[test]
  fn check_instant_bounds_years() {
    let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(check_instant(last).unwrap(), last);
    assert_eq!(check_instant(at(0, 1, 1)).unwrap(), at(0, 1, 1));

    let beyond = at(10000, 1, 1);
    assert!(matches!(check_instant(beyond), Err(Error::InstantOutOfRange(t)) if t == beyond));
    assert!(check_instant(at(-1, 12, 31)).is_err());
    assert!(check_instant(DateTime::<Utc>::MAX_UTC).is_err());
  }

  #[test]
  fn check_instant_truncates_to_micros() {
    let t = at(2024, 1, 1) + chrono::Duration::nanoseconds(1_500);
    assert_eq!(check_instant(t).unwrap(), at(2024, 1, 1) + chrono::Duration::microseconds(1));
  }

  #[test]
  fn start_of_day_truncates_to_midnight_utc() {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 17, 45, 12).unwrap();
    assert_eq!(start_of_day(t), at(2024, 3, 1));
  }
}
