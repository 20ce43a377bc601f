//! Handlers for `/subjects/:id/...` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects/:id/timetables` | Optional `?at=<rfc3339>`; defaults to now |
//! | `GET`  | `/subjects/:id/timetables/history` | Every lineage with its status at `at` |
//! | `PUT`  | `/subjects/:id/classroom` | Body: `{"classroom_id":"…"}` |

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use timetable_core::{
  entry::TimetableEntry,
  scope::ResolvedEntry,
  store::TimetableStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

#[derive(Debug, Deserialize)]
pub struct AtParams {
  /// Point in time to evaluate windows at. Defaults to now.
  pub at: Option<DateTime<Utc>>,
}

// ─── Active ───────────────────────────────────────────────────────────────────

/// `GET /subjects/:id/timetables[?at=...]`
pub async fn active<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(subject_id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<AtParams>,
) -> Result<Json<Vec<TimetableEntry>>, ApiError>
where
  S: TimetableStore,
{
  let entries = match params.at {
    Some(at) => timetable.active_at(subject_id, at).await?,
    None => timetable.active_now(subject_id).await?,
  };
  Ok(Json(entries))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /subjects/:id/timetables/history[?at=...]`
pub async fn history<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(subject_id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<AtParams>,
) -> Result<Json<Vec<ResolvedEntry>>, ApiError>
where
  S: TimetableStore,
{
  let at = params.at.unwrap_or_else(Utc::now);
  Ok(Json(timetable.history(subject_id, at).await?))
}

// ─── Classroom link ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub classroom_id: Uuid,
}

/// `PUT /subjects/:id/classroom` — body: `{"classroom_id":"…"}`
pub async fn link_classroom<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(subject_id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<LinkBody>,
) -> Result<StatusCode, ApiError>
where
  S: TimetableStore,
{
  timetable.link_subject(subject_id, body.classroom_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
