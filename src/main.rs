//! Binary entry point: load configuration, start file logging, open the
//! band database, and drive the TUI until the operator quits.
use std::fs;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marching_band::config::{DEFAULT_LOG_FILTER, LOG_FILE_NAME};
use marching_band::{run_app, App, Config, Store};

/// Log to a file; the terminal belongs to the UI. The returned guard flushes
/// buffered lines when dropped.
fn init_tracing(config: &Config) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir).context("failed to create log directory")?;
    let appender = tracing_appender::rolling::never(&config.log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Ok(guard)
}

fn main() -> Result<()> {
    let config = Config::load()?;
    let _guard = init_tracing(&config)?;
    info!(db = %config.db_path.display(), "marching band manager starting");

    let store = Store::open(&config.db_path)?;
    let mut app = App::new(store, config.export_dir)?;
    let result = run_app(&mut app);

    app.into_store().close()?;
    info!("marching band manager shutting down");
    result
}
