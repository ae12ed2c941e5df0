//! Structured logging infrastructure.
//!
//! Production-grade logging using the tracing framework: environment-based
//! filtering via `RUST_LOG`, pretty console output for development, JSON
//! output for log aggregation, and optional daily-rotated file output.
//!
//! Initialize once at application startup, before anything else logs:
//!
//! ```no_run
//! use contentpulse::observability;
//!
//! let _guard = observability::init_tracing(None, None, false);
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Initialize the tracing subscriber with configurable output formats.
///
/// # Arguments
///
/// * `log_level` - Optional level override (e.g. "debug"). Falls back to
///   the `RUST_LOG` environment variable, then to `contentpulse=info,warn`.
/// * `log_file` - Optional file path; enables a JSON file layer with daily
///   rotation.
/// * `json_output` - JSON console output instead of the pretty format.
///
/// Returns the file writer's guard when file logging is enabled; hold it
/// for the life of the process or buffered log lines are lost on exit.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        // Default: info for our app, warn for dependencies
        EnvFilter::new("contentpulse=info,warn")
    };

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let mut file_guard = None;
    let file_layer = if let Some(ref path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file_appender = tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_name().unwrap_or_else(|| OsStr::new("contentpulse.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);

        // File output is always JSON for structured log analysis
        Some(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .boxed(),
        )
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(file) = file_layer {
        subscriber.with(file).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized"
    );

    Ok(file_guard)
}

/// Initialize tracing for tests, ignoring double-init across test threads.
///
/// Use with `cargo test -- --nocapture` to see output.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("contentpulse=debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}
