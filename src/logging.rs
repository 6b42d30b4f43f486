//! Structured logging configuration
//!
//! Provides tracing-based logging with:
//! - JSON output for production
//! - Pretty formatting for development
//! - Console, file, or combined output selected via configuration
//! - `RUST_LOG`-style filtering through `EnvFilter`

use crate::config::get_config;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

// Keeps the non-blocking file writer flushing for the process lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the logging system based on configuration
pub fn init_logging() {
    let config = get_config();

    let log_level = &config.logging.level;
    let log_output = &config.logging.output;
    let log_format = &config.logging.format;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    match log_output.as_str() {
        "file" => init_file_logging(env_filter, log_format, &config.paths.log_directory),
        "both" => init_combined_logging(env_filter, log_format, &config.paths.log_directory),
        _ => init_console_logging(env_filter, log_format),
    }
}

fn init_console_logging(filter: EnvFilter, format: &str) {
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        _ => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .pretty(),
                )
                .init();
        }
    }
}

fn init_file_logging(filter: EnvFilter, format: &str, log_dir: &std::path::Path) {
    let file_appender = tracing_appender::rolling::daily(log_dir, "metrics-report.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_current_span(true)
                        .with_span_list(true),
                )
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
        }
    }
}

fn init_combined_logging(filter: EnvFilter, format: &str, log_dir: &std::path::Path) {
    let file_appender = tracing_appender::rolling::daily(log_dir, "metrics-report.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stdout))
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_writer(std::io::stdout))
                .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                .init();
        }
    }
}
