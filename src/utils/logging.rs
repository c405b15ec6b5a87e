//! Console and rolling-file logging, output directories

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIRECTORY: &str = "output/logs";
pub const LOG_FILE_PREFIX: &str = "range-pool-sync.log";

// alloy and the HTTP stack log every request at debug
const DEFAULT_DIRECTIVES: &str = "info,alloy=warn,hyper=warn,reqwest=warn";

/// Flushes the file writer when dropped. Hold it for the life of the process.
pub struct LoggingGuard {
    _file: WorkerGuard,
}

/// `RUST_LOG` when set, otherwise [`DEFAULT_DIRECTIVES`].
pub fn log_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = rust_log.filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_DIRECTIVES);
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter '{}'", directives))
}

/// Console plus a daily rolling file in [`LOG_DIRECTORY`].
pub fn setup_logging() -> Result<LoggingGuard> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(rust_log.as_deref())?;

    let file_appender = tracing_appender::rolling::daily(LOG_DIRECTORY, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(true)
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false)
                .compact()
        )
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { _file: guard })
}

/// Creates the log directory and the directory the snapshot is written to.
pub fn setup_output_directories(snapshot_path: &Path) -> Result<()> {
    std::fs::create_dir_all(LOG_DIRECTORY)
        .with_context(|| format!("Failed to create {}", LOG_DIRECTORY))?;
    if let Some(parent) = snapshot_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
