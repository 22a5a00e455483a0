//! Logging setup.
//!
//! Installs a `tracing_subscriber::fmt` subscriber. The filter comes from
//! `RUST_LOG` when set, otherwise from the supplied level. With a log file
//! configured, output goes through a non-blocking writer to a file that is
//! never rotated.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log file name: {0}")]
    InvalidLogFile(PathBuf),

    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),
}

/// Pick the filter directive: a non-empty `RUST_LOG` wins over `level`.
fn filter_directive(rust_log: Option<String>, level: &str) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ => level.to_string(),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    EnvFilter::new(filter_directive(rust_log, level))
}

/// Split a log file path into the directory and file name the appender wants.
fn split_log_path(log_file: &Path) -> Result<(PathBuf, String), TelemetryError> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| TelemetryError::InvalidLogFile(log_file.to_path_buf()))?
        .to_string_lossy()
        .to_string();
    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, file_name))
}

/// Install the global subscriber.
///
/// The returned guard must be held for the life of the process when logging
/// to a file; dropping it stops the background writer.
pub fn init_logging(
    level: &str,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, TelemetryError> {
    let builder = tracing_subscriber::fmt();

    let Some(log_file) = log_file else {
        builder
            .with_env_filter(env_filter(level))
            .try_init()
            .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;
        return Ok(None);
    };

    let (directory, file_name) = split_log_path(log_file)?;
    std::fs::create_dir_all(&directory).map_err(|source| TelemetryError::LogDir {
        path: directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    builder
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_env_filter(env_filter(level))
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_takes_precedence_over_level() {
        assert_eq!(
            filter_directive(Some("deadman_production=trace".into()), "info"),
            "deadman_production=trace"
        );
        assert_eq!(filter_directive(None, "debug"), "debug");
        assert_eq!(filter_directive(Some("  ".into()), "warn"), "warn");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("/var/log/deadman.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(name, "deadman.log");

        let (dir, name) = split_log_path(Path::new("deadman.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "deadman.log");

        assert!(matches!(
            split_log_path(Path::new("/")),
            Err(TelemetryError::InvalidLogFile(_))
        ));
    }
}
