//! [`Timetable`] — validated operations over any [`TimetableStore`].
//!
//! Assignment creates or reactivates one lineage per weekday, termination
//! narrows a single row's window by [`Scope`], and the two read paths answer
//! "what is active for this subject at X" and "what overlaps this range for
//! this classroom".

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  entry::{Slot, TimeOfDay, TimetableEntry, Weekday, check_instant},
  scope::{EntryStatus, ResolvedEntry, Scope},
  store::TimetableStore,
};

/// Actor recorded when an assignment does not name one.
pub const DEFAULT_ACTOR: &str = "system";

// ─── Requests ────────────────────────────────────────────────────────────────

/// Unvalidated input to [`Timetable::assign`].
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
  pub subject_id: Uuid,
  /// `HH:MM`
  pub start:      String,
  /// `HH:MM`
  pub end:        String,
  /// 0 = Sunday … 6 = Saturday.
  pub weekdays:   Vec<i64>,
  pub created_by: Option<String>,
}

/// An [`AssignRequest`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
  pub subject_id: Uuid,
  pub start:      TimeOfDay,
  pub end:        TimeOfDay,
  pub weekdays:   BTreeSet<Weekday>,
  pub created_by: String,
}

impl AssignRequest {
  /// Check times and weekdays without touching any store. Duplicate weekdays
  /// collapse; the order of `start` and `end` is not checked.
  pub fn validate(&self) -> Result<Assignment> {
    let start = TimeOfDay::parse(&self.start)?;
    let end = TimeOfDay::parse(&self.end)?;
    let weekdays = self
      .weekdays
      .iter()
      .map(|&d| Weekday::new(d))
      .collect::<Result<BTreeSet<_>>>()?;

    Ok(Assignment {
      subject_id: self.subject_id,
      start,
      end,
      weekdays,
      created_by: self
        .created_by
        .clone()
        .unwrap_or_else(|| DEFAULT_ACTOR.to_owned()),
    })
  }
}

impl Assignment {
  /// One lineage key per weekday, in weekday order.
  pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
    self.weekdays.iter().map(|&weekday| Slot {
      subject_id: self.subject_id,
      weekday,
      start: self.start,
      end: self.end,
    })
  }
}

/// Input to [`Timetable::terminate`]. A bare id converts into a request with
/// the default scope and no occurrence date.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminateRequest {
  pub entry_id:        Uuid,
  #[serde(default)]
  pub scope:           Option<Scope>,
  /// Defaults to the current instant.
  #[serde(default)]
  pub occurrence_date: Option<DateTime<Utc>>,
}

impl From<Uuid> for TerminateRequest {
  fn from(entry_id: Uuid) -> Self {
    Self { entry_id, scope: None, occurrence_date: None }
  }
}

/// A half-open date range, typically an academic year. Both bounds are
/// truncated to microseconds, the precision entries are stored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcademicRange {
  start: DateTime<Utc>,
  end:   DateTime<Utc>,
}

impl AcademicRange {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
    let start = check_instant(start)?;
    let end = check_instant(end)?;
    if start >= end {
      return Err(Error::InvalidRange);
    }
    Ok(Self { start, end })
  }

  pub fn start(&self) -> DateTime<Utc> { self.start }

  pub fn end(&self) -> DateTime<Utc> { self.end }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The timetable engine. Cloning is as cheap as cloning the store.
#[derive(Debug, Clone)]
pub struct Timetable<S> {
  store: S,
}

impl<S: TimetableStore> Timetable<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Place a subject in a classroom so it shows up in
  /// [`overlapping`](Self::overlapping).
  pub async fn link_subject(
    &self,
    subject_id: Uuid,
    classroom_id: Uuid,
  ) -> Result<()> {
    self
      .store
      .link_subject(subject_id, classroom_id)
      .await
      .map_err(Error::store)
  }

  // ── Assignment ────────────────────────────────────────────────────────

  /// [`assign_at`](Self::assign_at) the current instant.
  pub async fn assign(
    &self,
    request: &AssignRequest,
  ) -> Result<Vec<TimetableEntry>> {
    self.assign_at(request, Utc::now()).await
  }

  /// Create or reactivate one lineage per requested weekday, effective from
  /// `now`.
  ///
  /// The request is validated before any store access. Weekdays are applied
  /// one at a time; a failure leaves earlier weekdays assigned.
  pub async fn assign_at(
    &self,
    request: &AssignRequest,
    now: DateTime<Utc>,
  ) -> Result<Vec<TimetableEntry>> {
    let assignment = request.validate()?;
    let now = check_instant(now)?;

    let mut entries = Vec::with_capacity(assignment.weekdays.len());
    for slot in assignment.slots() {
      tracing::debug!(
        subject_id = %slot.subject_id,
        weekday = %slot.weekday,
        start = %slot.start,
        end = %slot.end,
        "upserting lineage"
      );
      let entry = self
        .store
        .upsert_lineage(slot, assignment.created_by.clone(), now)
        .await
        .map_err(Error::store)?;
      entries.push(entry);
    }

    tracing::info!(
      subject_id = %assignment.subject_id,
      slots = entries.len(),
      "assigned timetable"
    );
    Ok(entries)
  }

  // ── Termination ───────────────────────────────────────────────────────

  /// [`terminate_at`](Self::terminate_at) the current instant.
  pub async fn terminate(
    &self,
    request: impl Into<TerminateRequest>,
  ) -> Result<TimetableEntry> {
    self.terminate_at(request, Utc::now()).await
  }

  /// Narrow the window of the addressed row according to its scope and
  /// return the updated row. No other row is touched.
  pub async fn terminate_at(
    &self,
    request: impl Into<TerminateRequest>,
    now: DateTime<Utc>,
  ) -> Result<TimetableEntry> {
    let request = request.into();
    let now = check_instant(now)?;
    let scope = request.scope.unwrap_or_default();
    let occurrence = request
      .occurrence_date
      .map(check_instant)
      .transpose()?
      .unwrap_or(now);

    let entry = self
      .store
      .get_entry(request.entry_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EntryNotFound(request.entry_id))?;

    let next = scope.apply(&entry, occurrence, now)?;
    if next != entry {
      self.store.save(&next).await.map_err(Error::store)?;
    }

    tracing::info!(
      entry_id = %next.entry_id,
      %scope,
      valid_from = %next.valid_from,
      valid_to = ?next.valid_to,
      "terminated timetable entry"
    );
    Ok(next)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// [`active_at`](Self::active_at) the current instant.
  pub async fn active_now(&self, subject_id: Uuid) -> Result<Vec<TimetableEntry>> {
    self.active_at(subject_id, Utc::now()).await
  }

  /// Entries of `subject_id` active at `at`, ordered by weekday then start.
  pub async fn active_at(
    &self,
    subject_id: Uuid,
    at: DateTime<Utc>,
  ) -> Result<Vec<TimetableEntry>> {
    let at = check_instant(at)?;
    tracing::debug!(%subject_id, %at, "querying active entries");
    self
      .store
      .find_active(subject_id, at)
      .await
      .map_err(Error::store)
  }

  /// Entries of a classroom whose window overlaps `range`.
  pub async fn overlapping(
    &self,
    classroom_id: Uuid,
    range: AcademicRange,
  ) -> Result<Vec<TimetableEntry>> {
    tracing::debug!(
      %classroom_id,
      start = %range.start,
      end = %range.end,
      "querying overlapping entries"
    );
    self
      .store
      .find_overlapping(classroom_id, range.start, range.end)
      .await
      .map_err(Error::store)
  }

  /// [`overlapping`](Self::overlapping), grouped by weekday with each day
  /// ordered by start time.
  pub async fn weekly_view(
    &self,
    classroom_id: Uuid,
    range: AcademicRange,
  ) -> Result<BTreeMap<Weekday, Vec<TimetableEntry>>> {
    let mut week: BTreeMap<Weekday, Vec<TimetableEntry>> = BTreeMap::new();
    for entry in self.overlapping(classroom_id, range).await? {
      week.entry(entry.weekday).or_default().push(entry);
    }
    for day in week.values_mut() {
      day.sort_by_key(|e| (e.start, e.end));
    }
    Ok(week)
  }

  /// Every lineage of a subject with its status at `at`.
  pub async fn history(
    &self,
    subject_id: Uuid,
    at: DateTime<Utc>,
  ) -> Result<Vec<ResolvedEntry>> {
    let at = check_instant(at)?;
    let entries = self
      .store
      .list_lineages(subject_id)
      .await
      .map_err(Error::store)?;

    Ok(
      entries
        .into_iter()
        .map(|entry| {
          let status = EntryStatus::of(&entry, at);
          ResolvedEntry { entry, status }
        })
        .collect(),
    )
  }
}
