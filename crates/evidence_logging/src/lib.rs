//! Shared logging utilities for the Evidence MCP binaries.
//!
//! The MCP server owns stdout for JSON-RPC traffic, so console output always
//! goes to stderr. A daily-rotated log file under the app home keeps a copy of
//! everything that passed the filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str =
    "evidence=info,evidence_catalog=info,evidence_db=info,evidence_mcp=info";
const DEBUG_LOG_FILTER: &str =
    "evidence=debug,evidence_catalog=debug,evidence_db=debug,evidence_mcp=debug";
const MAX_LOG_FILES: usize = 5;

/// Logging configuration shared by the binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Keeps the background file writer alive. Drop it last in `main`.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LogGuard {
    /// Directory the file layer writes to, if one was installed.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize tracing with a rolling file writer and stderr output.
///
/// A log directory that cannot be created is not fatal: the file layer is
/// skipped and a warning is emitted once the subscriber is up.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose {
        EnvFilter::new(DEBUG_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let (file_layer, file_guard, log_dir, file_error) = match open_file_writer(config.app_name) {
        Ok((appender, dir)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard), Some(dir), None)
        }
        Err(err) => (None, None, None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(err) = file_error {
        tracing::warn!("File logging disabled: {:#}", err);
    }

    Ok(LogGuard {
        _file_guard: file_guard,
        log_dir,
    })
}

fn open_file_writer(app_name: &str) -> Result<(RollingFileAppender, PathBuf)> {
    let dir = ensure_logs_dir()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(sanitize_name(app_name))
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))?;
    Ok((appender, dir))
}

/// Get the app home directory: ~/.evidence_mcp
///
/// Priority:
/// 1) EVIDENCE_MCP_HOME
/// 2) the user's home directory
/// 3) ./.evidence_mcp
pub fn evidence_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("EVIDENCE_MCP_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".evidence_mcp")
}

/// Get the logs directory: ~/.evidence_mcp/logs
pub fn logs_dir() -> PathBuf {
    evidence_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_name("mcp-evidence"), "mcp-evidence");
        assert_eq!(sanitize_name("../evil name"), "___evil_name");
    }

    #[test]
    fn logs_dir_is_under_home() {
        assert!(logs_dir().starts_with(evidence_home()));
        assert!(logs_dir().ends_with("logs"));
    }
}
