//! Timetable API server binary.
//!
//! Settings come from `config.toml` (or `--config <path>`), overridden by
//! `TIMETABLE_HOST`, `TIMETABLE_PORT` and `TIMETABLE_STORE_PATH`. The store is
//! a single SQLite file; entries are never deleted, so it only grows.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use timetable_api::ServerConfig;
use timetable_core::timetable::Timetable;
use timetable_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Recurring weekly timetable server")]
struct Cli {
  /// TOML settings file; a missing file falls back to defaults.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override the SQLite database path from the settings file.
  #[arg(long)]
  store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli)?;

  let store_path = expand_home(&settings.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("cannot open timetable database {store_path:?}"))?;
  tracing::info!(path = %store_path.display(), "timetable store ready");

  let router = timetable_api::api_router(Timetable::new(store));
  let listener = TcpListener::bind((settings.host.as_str(), settings.port))
    .await
    .with_context(|| format!("cannot bind {}:{}", settings.host, settings.port))?;
  tracing::info!(address = %listener.local_addr()?, "serving timetable API");

  axum::serve(listener, router)
    .await
    .context("timetable API server stopped")
}

/// Layer the settings file, `TIMETABLE_*` variables and CLI overrides.
fn load_settings(cli: &Cli) -> anyhow::Result<ServerConfig> {
  let mut settings: ServerConfig = config::Config::builder()
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("TIMETABLE"))
    .build()
    .with_context(|| format!("cannot read settings from {:?}", cli.config))?
    .try_deserialize()
    .context("invalid server settings")?;

  if let Some(store) = &cli.store {
    settings.store_path = store.clone();
  }
  Ok(settings)
}

/// Resolve a `~/`-relative database path against `$HOME`.
fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
