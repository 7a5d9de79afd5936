//! Structured logging setup.
//!
//! Logs to `${BIFROST_HOME}/logs/bifrost.{date}.log` with daily rotation,
//! keeping 7 days. The TUI owns the terminal, so nothing is written to
//! stdout/stderr unless the file appender cannot be created.
//! Level is controlled via `RUST_LOG`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::paths;

const DEFAULT_FILTER: &str = "bifrost=info,bifrost_core=info,bifrost_tui=info";

/// Installs the global subscriber.
///
/// Keep the returned guard alive for the duration of the program so buffered
/// lines are flushed on exit. Returns `None` when logging fell back to stderr
/// or a subscriber was already installed.
pub fn init() -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match create_file_appender(&paths::logs_dir()) {
        Ok(file_appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let installed = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .try_init()
                .is_ok();
            installed.then_some(guard)
        }
        Err(_) => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();
            None
        }
    }
}

fn create_file_appender(
    dir: &Path,
) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    let _ = std::fs::create_dir_all(dir);
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("bifrost")
        .filename_suffix("log")
        .max_log_files(7)
        .build(dir)
}
