//! JSON REST API for the timetable engine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`timetable_core::store::TimetableStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", timetable_api::api_router(Timetable::new(store)))
//! ```

pub mod classrooms;
pub mod error;
pub mod extract;
pub mod subjects;
pub mod timetables;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use serde::Deserialize;
use timetable_core::{store::TimetableStore, timetable::Timetable};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TIMETABLE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("timetable.sqlite3") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Shared handler state.
pub type AppState<S> = Arc<Timetable<S>>;

/// Build a fully-materialised API router for `timetable`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(timetable: Timetable<S>) -> Router<()>
where
  S: TimetableStore + 'static,
{
  Router::new()
    // Timetable entries
    .route("/timetables", post(timetables::create::<S>))
    .route("/timetables/{id}", delete(timetables::delete_one::<S>))
    .route("/timetables/{id}/terminate", post(timetables::terminate_one::<S>))
    // Subjects
    .route("/subjects/{id}/timetables", get(subjects::active::<S>))
    .route("/subjects/{id}/timetables/history", get(subjects::history::<S>))
    .route("/subjects/{id}/classroom", put(subjects::link_classroom::<S>))
    // Classrooms
    .route("/classrooms/{id}/timetables", get(classrooms::overlapping::<S>))
    .route("/classrooms/{id}/timetables/weekly", get(classrooms::weekly::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(Arc::new(timetable))
}
