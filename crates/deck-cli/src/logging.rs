//! File-based logging setup.
//!
//! The TUI owns the terminal, so logs go to a daily-rolling file under
//! ${DECK_HOME}/logs instead of stderr. Filtering is controlled by the
//! DECK_LOG environment variable (default: info).

use deck_engine::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber with a rolling file writer.
///
/// Returns the worker guard; hold it for the process lifetime so buffered
/// log lines are flushed on exit.
pub fn init() -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(paths::logs_dir(), "deck.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("DECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .try_init()
        .is_ok();

    initialized.then_some(guard)
}
