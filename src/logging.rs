//! Logging initialization for leadcollect.
//!
//! Server mode: logs to `<state>/logs/leadcollect-{datetime}.log`
//! CLI mode: logs to stderr

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered file output when dropped
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set in server mode with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Where log output goes for a given run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File { dir: PathBuf, file_name: String },
}

impl LogTarget {
    /// Long-running servers log to a file when enabled; everything else to stderr
    pub fn select(config: &Config, is_server: bool) -> LogTarget {
        if is_server && config.logging.to_file {
            LogTarget::File {
                dir: config.logs_path(),
                file_name: log_file_name(chrono::Utc::now()),
            }
        } else {
            LogTarget::Stderr
        }
    }
}

pub fn log_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("leadcollect-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

/// Filter directive: `--debug` wins over the configured level
pub fn filter_directive(config: &Config, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG`, when set, replaces the configured level. The returned handle
/// must be kept alive for the duration of the program.
pub fn init_logging(
    config: &Config,
    is_server: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let level = filter_directive(config, debug_override);
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(level));

    match LogTarget::select(config, is_server) {
        LogTarget::File { dir, file_name } => {
            std::fs::create_dir_all(&dir)?;
            let log_file_path = dir.join(&file_name);

            let file_appender = tracing_appender::rolling::never(&dir, &file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .init();

            Ok(LoggingHandle {
                _guard: Some(guard),
                log_file_path: Some(log_file_path),
            })
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();

            Ok(LoggingHandle {
                _guard: None,
                log_file_path: None,
            })
        }
    }
}

/// Whether `path` sits in the configured logs directory
pub fn is_log_file(config: &Config, path: &Path) -> bool {
    path.starts_with(config.logs_path())
        && path.extension().is_some_and(|ext| ext == "log")
}
