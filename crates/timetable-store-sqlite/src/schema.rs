//! SQL schema for the timetable SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Mirror of the subject -> classroom placement owned by the host application.
CREATE TABLE IF NOT EXISTS subject_classrooms (
    subject_id   TEXT PRIMARY KEY,
    classroom_id TEXT NOT NULL
);

-- One row per lineage. Rows are never deleted; terminations and
-- reactivations rewrite valid_from / valid_to in place.
CREATE TABLE IF NOT EXISTS timetable_entries (
    entry_id    TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL,
    weekday     INTEGER NOT NULL CHECK (weekday BETWEEN 0 AND 6),
    start_time  TEXT NOT NULL,   -- HH:MM
    end_time    TEXT NOT NULL,   -- HH:MM
    valid_from  TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    valid_to    TEXT,            -- NULL = open
    created_by  TEXT NOT NULL,
    UNIQUE (subject_id, weekday, start_time, end_time)
);

CREATE INDEX IF NOT EXISTS entries_subject_idx   ON timetable_entries(subject_id);
CREATE INDEX IF NOT EXISTS classrooms_lookup_idx ON subject_classrooms(classroom_id);

PRAGMA user_version = 1;
";
