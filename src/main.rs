//! Binary entry point for the contentpulse API server.
//!
//! # Layer Separation
//!
//! - **main.rs**: Async runtime + tracing initialization only
//! - **CLI module**: Command dispatch + layer orchestration
//! - **Core modules**: Independent, reusable, no upward dependencies
//!
//! All errors bubble up with context via `PlatformResult<T>`.

use contentpulse::{cli, observability};
use tracing::error;

/// Entry point for the contentpulse API server.
///
/// Initializes structured logging first, then delegates to the CLI module.
/// Logging is controlled via environment variables:
/// - `RUST_LOG`: log level (e.g. "debug", "contentpulse=trace")
/// - `LOG_JSON`: JSON console output for production ("true" or "false")
/// - `LOG_FILE`: write logs to a file with daily rotation
#[tokio::main]
async fn main() {
    let log_level = std::env::var("RUST_LOG").ok();
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    // The guard must stay alive for the life of the process so buffered
    // file log lines are flushed on exit
    let _log_guard = match observability::init_tracing(log_level, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Application error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
