//! Logging configuration for KnowledgeExplorer

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::AppConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "knowledge-explorer.log";

/// Build the filter directive for a level, scoping the crate to the same level
#[must_use]
pub fn filter_directive(level: &str) -> String {
    let level = level.to_lowercase();
    format!("{level},knowledge_explorer={level}")
}

/// Initialize logging with the configured level and log directory
///
/// `RUST_LOG` takes precedence over the configured level when it is set.
/// The returned guard flushes the file writer on drop and must be kept alive.
pub fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.logging.level)));
    init_with_filter(env_filter, &config.logging.log_dir, &config.logging.level)
}

/// Initialize logging with custom log level, ignoring `RUST_LOG`
pub fn init_logging_with_level(level: &str, log_dir: &str) -> Result<WorkerGuard> {
    init_with_filter(EnvFilter::new(filter_directive(level)), log_dir, level)
}

fn init_with_filter(env_filter: EnvFilter, log_dir: &str, level: &str) -> Result<WorkerGuard> {
    let logs_dir = Path::new(log_dir);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized with level: {} - console and file output enabled", level);
    tracing::info!("Log files will be saved to: {}/{}.YYYY-MM-DD", log_dir, LOG_FILE_PREFIX);

    Ok(guard)
}

/// Initialize simple logging for testing
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_simple_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
