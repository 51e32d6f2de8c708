//! Logging setup
//!
//! The TUI owns the terminal, so logs go to a daily-rotated file through a
//! non-blocking writer. `RUST_LOG` wins over the configured level.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name prefix
const LOG_FILE_PREFIX: &str = "promptalchemy.log";

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No usable log directory")]
    NoDirectory,

    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Resolve the log directory: configured, else `<cache_dir>/promptalchemy/logs`
pub fn log_directory(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .directory
        .clone()
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("promptalchemy").join("logs")))
}

/// Build the level filter from `RUST_LOG`, else the configured level
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Keep the returned guard alive for the whole program; dropping it flushes
/// and stops the writer thread.
pub fn init(settings: &LoggingSettings) -> Result<WorkerGuard, LoggingError> {
    let directory = log_directory(settings).ok_or(LoggingError::NoDirectory)?;
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::CreateDir {
        path: directory.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(guard)
}
