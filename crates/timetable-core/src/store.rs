//! The `TimetableStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `timetable-store-sqlite`). The [`crate::timetable::Timetable`] service and
//! the HTTP layer depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entry::{Slot, TimetableEntry};

/// Abstraction over a timetable persistence backend.
///
/// One row exists per lineage. Rows are never deleted; only their validity
/// window is rewritten.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TimetableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subject placement ─────────────────────────────────────────────────

  /// Record the classroom a subject is taught in. Relinking replaces the
  /// previous classroom.
  fn link_subject(
    &self,
    subject_id: Uuid,
    classroom_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert the lineage for `slot`, or reactivate the existing row in place
  /// (`valid_from = now`, `valid_to = NULL`).
  ///
  /// Must be a single atomic operation per slot: concurrent calls for the
  /// same slot converge on one row.
  fn upsert_lineage(
    &self,
    slot: Slot,
    created_by: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<TimetableEntry, Self::Error>> + Send + '_;

  /// Write the validity window of `entry` back to its row.
  ///
  /// Returns an error if no row has `entry.entry_id`.
  fn save<'a>(
    &'a self,
    entry: &'a TimetableEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a row by id. Returns `None` if not found.
  fn get_entry(
    &self,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<TimetableEntry>, Self::Error>> + Send + '_;

  /// Rows of `subject_id` active at `at`, ordered by `(weekday, start)`.
  fn find_active(
    &self,
    subject_id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<TimetableEntry>, Self::Error>> + Send + '_;

  /// Rows of every subject linked to `classroom_id` whose window overlaps
  /// `[range_start, range_end)`, ordered by `(weekday, start)`.
  fn find_overlapping(
    &self,
    classroom_id: Uuid,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<TimetableEntry>, Self::Error>> + Send + '_;

  /// Every row of `subject_id`, regardless of window.
  fn list_lineages(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TimetableEntry>, Self::Error>> + Send + '_;
}
