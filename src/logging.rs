use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive to ensure logs are flushed
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Initialize the logging system, writing to a daily-rotated file under
/// `log_dir`. Call once during startup.
pub fn init_logging(log_dir: &Path) -> LoggingGuard {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).expect("Failed to create logs directory");
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "taskwise.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global tracing subscriber");

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    LoggingGuard { _guard: guard }
}
