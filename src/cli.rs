//! Command-line interface for the content-marketing API platform.
//!
//! # Commands
//!
//! - `serve`: Run the HTTP API server
//! - `check-config`: Load and print the effective configuration, then exit
//!
//! # Example
//!
//! ```bash
//! # Run the server on the configured port
//! contentpulse serve
//!
//! # Run on an explicit port
//! contentpulse serve --port 9090
//!
//! # Validate environment configuration
//! contentpulse check-config
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use crate::app_state::AppState;
use crate::config::Config;
use crate::error::{PlatformError, PlatformResult};

/// Contentpulse content-marketing API platform
#[derive(Parser, Debug)]
#[command(name = "contentpulse")]
#[command(about = "Content-marketing API platform: A/B experiments, analytics passthrough, rate limiting", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Listen port (overrides the PORT environment variable)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and print the effective configuration
    CheckConfig,
}

/// Parse CLI arguments and execute the appropriate command.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration loading fails
/// - The server fails to bind or crashes
pub async fn run() -> PlatformResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => run_serve_command(port).await,
        Commands::CheckConfig => run_check_config_command(),
    }
}

/// Execute the serve command.
async fn run_serve_command(port: Option<u16>) -> PlatformResult<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.set_port(port);
    }

    info!(
        port = config.port(),
        rate_limit_points = config.rate_limit_points(),
        rate_limit_window_secs = config.rate_limit_window().as_secs(),
        analytics_configured = config.analytics_base_url().is_some(),
        "Configuration loaded"
    );

    let state = AppState::new(config)?;

    crate::api::server::run_server(state)
        .await
        .map_err(|e| PlatformError::config(format!("server failed: {e}"), None))
}

/// Execute the check-config command.
fn run_check_config_command() -> PlatformResult<()> {
    let config = Config::from_env()?;

    println!("{}", "Configuration OK".green().bold());
    println!("  port:               {}", config.port());
    println!(
        "  rate limit:         {} requests / {}s",
        config.rate_limit_points(),
        config.rate_limit_window().as_secs()
    );
    println!(
        "  cors origins:       {}",
        if config.cors_origins().is_empty() {
            "any".to_string()
        } else {
            config.cors_origins().join(", ")
        }
    );
    match config.analytics_base_url() {
        Some(url) => println!("  analytics upstream: {url}"),
        None => println!(
            "  analytics upstream: {}",
            "not configured (passthrough disabled)".yellow()
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_with_port() {
        let cli = Cli::try_parse_from(["contentpulse", "serve", "--port", "9090"]);
        assert!(cli.is_ok());

        if let Ok(Cli {
            command: Commands::Serve { port },
        }) = cli
        {
            assert_eq!(port, Some(9090));
        }
    }

    #[test]
    fn test_cli_parses_check_config() {
        let cli = Cli::try_parse_from(["contentpulse", "check-config"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::CheckConfig
            })
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        let cli = Cli::try_parse_from(["contentpulse", "frobnicate"]);
        assert!(cli.is_err());
    }
}
