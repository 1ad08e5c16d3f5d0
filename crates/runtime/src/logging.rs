//! Tracing subscriber setup.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogConfig;
use crate::error::{Result, RuntimeError};

/// Installs the global subscriber: stderr always, plus a file when configured.
///
/// `RUST_LOG` overrides `config.filter`. The returned guard must be held for
/// as long as file logging should keep flushing.
pub fn init_tracing(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| RuntimeError::Logging(e.to_string()))?;

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| RuntimeError::Logging(format!("{} is not a file", path.display())))?;
            fs::create_dir_all(dir).map_err(|e| RuntimeError::io(dir, e))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| RuntimeError::Logging(e.to_string()))?;

    tracing::info!(target: "runtime", filter = %config.filter, "logging initialized");
    Ok(guard)
}
