//! Handlers for `/classrooms/:id/...` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/classrooms/:id/timetables` | `?start=&end=` required (RFC 3339) |
//! | `GET`  | `/classrooms/:id/timetables/weekly` | Same range, grouped by weekday |

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use timetable_core::{
  entry::{TimetableEntry, Weekday},
  store::TimetableStore,
  timetable::AcademicRange,
};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiPath, ApiQuery},
};

/// The academic-year range to evaluate; `start` must precede `end`.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl RangeParams {
  fn into_range(self) -> Result<AcademicRange, ApiError> {
    Ok(AcademicRange::new(self.start, self.end)?)
  }
}

/// `GET /classrooms/:id/timetables?start=...&end=...`
pub async fn overlapping<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(classroom_id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<Vec<TimetableEntry>>, ApiError>
where
  S: TimetableStore,
{
  let range = params.into_range()?;
  Ok(Json(timetable.overlapping(classroom_id, range).await?))
}

/// `GET /classrooms/:id/timetables/weekly?start=...&end=...`
pub async fn weekly<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(classroom_id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<BTreeMap<Weekday, Vec<TimetableEntry>>>, ApiError>
where
  S: TimetableStore,
{
  let range = params.into_range()?;
  Ok(Json(timetable.weekly_view(classroom_id, range).await?))
}
