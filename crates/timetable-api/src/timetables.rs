//! Handlers for `/timetables` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/timetables` | Body: [`AssignRequest`]; returns 201 + entries |
//! | `POST`   | `/timetables/:id/terminate` | Optional body: [`TerminateBody`] |
//! | `DELETE` | `/timetables/:id` | Scope `today`, occurrence now |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use timetable_core::{
  entry::TimetableEntry,
  scope::Scope,
  store::TimetableStore,
  timetable::{AssignRequest, TerminateRequest},
};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /timetables` — body:
/// `{"subject_id":"…","start":"08:00","end":"09:00","weekdays":[1,3]}`
pub async fn create<S>(
  State(timetable): State<AppState<S>>,
  ApiJson(body): ApiJson<AssignRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TimetableStore,
{
  let entries = timetable.assign(&body).await?;
  Ok((StatusCode::CREATED, Json(entries)))
}

// ─── Terminate ────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /timetables/:id/terminate`. Both fields are
/// optional; `{}` or no body at all behaves like `DELETE`.
#[derive(Debug, Default, Deserialize)]
pub struct TerminateBody {
  pub scope:           Option<Scope>,
  pub occurrence_date: Option<DateTime<Utc>>,
}

/// `POST /timetables/:id/terminate`
pub async fn terminate_one<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(entry_id): ApiPath<Uuid>,
  body: Option<ApiJson<TerminateBody>>,
) -> Result<Json<TimetableEntry>, ApiError>
where
  S: TimetableStore,
{
  let body = body.map(|ApiJson(b)| b).unwrap_or_default();
  let entry = timetable
    .terminate(TerminateRequest {
      entry_id,
      scope: body.scope,
      occurrence_date: body.occurrence_date,
    })
    .await?;
  Ok(Json(entry))
}

/// `DELETE /timetables/:id` — closes the entry as of now.
pub async fn delete_one<S>(
  State(timetable): State<AppState<S>>,
  ApiPath(entry_id): ApiPath<Uuid>,
) -> Result<Json<TimetableEntry>, ApiError>
where
  S: TimetableStore,
{
  Ok(Json(timetable.terminate(entry_id).await?))
}
