//! Logging initialization.
//!
//! Code logs through the `log` macros; `tracing-log` forwards them into a
//! `tracing` subscriber that writes JSON lines to a daily rolling file in the
//! app data directory. Nothing is written to stdout while the TUI owns the
//! terminal.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "chatbot-tui.log";

/// Default log directory: `<data_dir>/chatbot-tui/logs`.
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("chatbot-tui").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize file-only logging for TUI mode.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered log lines are flushed on shutdown.
pub fn init_tui() -> WorkerGuard {
    init_in(&default_log_dir())
}

/// Initialize file-only logging into `log_dir`.
pub fn init_in(log_dir: &Path) -> WorkerGuard {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter);

    // No stdout layer: the TUI owns the terminal
    if let Err(e) = tracing_subscriber::registry().with(file_layer).try_init() {
        eprintln!("Failed to initialize tracing subscriber: {}", e);
    }

    // Redirect `log` macros to `tracing`; the subscriber is built without its
    // own bridge so this is the only install
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}
