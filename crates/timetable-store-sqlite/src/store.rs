//! [`SqliteStore`] — the SQLite implementation of [`TimetableStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use timetable_core::{
  entry::{Slot, TimetableEntry},
  store::TimetableStore,
};

use crate::{
  encode::{ENTRY_COLUMNS, RawEntry, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A timetable store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for SqliteStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SqliteStore").finish_non_exhaustive()
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened timetable store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT <ENTRY_COLUMNS> ...` statement and decode every row.
  async fn select_entries(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<TimetableEntry>> {
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}

// ─── TimetableStore impl ─────────────────────────────────────────────────────

impl TimetableStore for SqliteStore {
  type Error = Error;

  // ── Subject placement ─────────────────────────────────────────────────────

  async fn link_subject(&self, subject_id: Uuid, classroom_id: Uuid) -> Result<()> {
    let subject_str   = encode_uuid(subject_id);
    let classroom_str = encode_uuid(classroom_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subject_classrooms (subject_id, classroom_id) VALUES (?1, ?2)
           ON CONFLICT (subject_id) DO UPDATE SET classroom_id = excluded.classroom_id",
          rusqlite::params![subject_str, classroom_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_lineage(
    &self,
    slot:       Slot,
    created_by: String,
    now:        DateTime<Utc>,
  ) -> Result<TimetableEntry> {
    let entry_id_str   = encode_uuid(Uuid::new_v4());
    let subject_id_str = encode_uuid(slot.subject_id);
    let weekday        = i64::from(slot.weekday.number());
    let start_str      = slot.start.to_string();
    let end_str        = slot.end.to_string();
    let now_str        = encode_dt(now);

    // The generated id is discarded when the slot already has a row; the
    // existing row keeps its id and creator.
    let raw: RawEntry = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO timetable_entries (
             entry_id, subject_id, weekday, start_time, end_time,
             valid_from, valid_to, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)
           ON CONFLICT (subject_id, weekday, start_time, end_time)
           DO UPDATE SET valid_from = excluded.valid_from, valid_to = NULL
           RETURNING {ENTRY_COLUMNS}"
        );
        Ok(conn.query_row(
          &sql,
          rusqlite::params![
            entry_id_str,
            subject_id_str,
            weekday,
            start_str,
            end_str,
            now_str,
            created_by,
          ],
          RawEntry::from_row,
        )?)
      })
      .await?;

    raw.into_entry()
  }

  async fn save(&self, entry: &TimetableEntry) -> Result<()> {
    let entry_id   = entry.entry_id;
    let id_str     = encode_uuid(entry_id);
    let from_str   = encode_dt(entry.valid_from);
    let to_str     = entry.valid_to.map(encode_dt);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE timetable_entries SET valid_from = ?2, valid_to = ?3
           WHERE entry_id = ?1",
          rusqlite::params![id_str, from_str, to_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EntryNotFound(entry_id));
    }
    tracing::debug!(%entry_id, "saved validity window");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_entry(&self, entry_id: Uuid) -> Result<Option<TimetableEntry>> {
    let id_str = encode_uuid(entry_id);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM timetable_entries WHERE entry_id = ?1"),
            rusqlite::params![id_str],
            RawEntry::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn find_active(
    &self,
    subject_id: Uuid,
    at:         DateTime<Utc>,
  ) -> Result<Vec<TimetableEntry>> {
    let sql = format!(
      "SELECT {ENTRY_COLUMNS} FROM timetable_entries
       WHERE subject_id = ?1
         AND valid_from <= ?2
         AND (valid_to IS NULL OR valid_to > ?2)
       ORDER BY weekday, start_time"
    );
    self
      .select_entries(sql, vec![encode_uuid(subject_id), encode_dt(at)])
      .await
  }

  async fn find_overlapping(
    &self,
    classroom_id: Uuid,
    range_start:  DateTime<Utc>,
    range_end:    DateTime<Utc>,
  ) -> Result<Vec<TimetableEntry>> {
    let sql = format!(
      "SELECT {ENTRY_COLUMNS} FROM timetable_entries
       WHERE subject_id IN (
               SELECT subject_id FROM subject_classrooms WHERE classroom_id = ?1
             )
         AND valid_from < ?3
         AND (valid_to IS NULL OR valid_to > ?2)
       ORDER BY weekday, start_time"
    );
    self
      .select_entries(
        sql,
        vec![
          encode_uuid(classroom_id),
          encode_dt(range_start),
          encode_dt(range_end),
        ],
      )
      .await
  }

  async fn list_lineages(&self, subject_id: Uuid) -> Result<Vec<TimetableEntry>> {
    let sql = format!(
      "SELECT {ENTRY_COLUMNS} FROM timetable_entries
       WHERE subject_id = ?1
       ORDER BY weekday, start_time, end_time"
    );
    self.select_entries(sql, vec![encode_uuid(subject_id)]).await
  }
}
