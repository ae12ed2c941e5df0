//! Configuration management for the content-marketing API platform.
//!
//! This module handles loading and validating configuration from environment
//! variables using the `dotenvy` crate. All operations return
//! [`PlatformResult`] for comprehensive error handling.
//!
//! ## Environment Variables
//!
//! All variables are optional (with defaults):
//! - `PORT`: HTTP listen port (default: 8080)
//! - `RATE_LIMIT_POINTS`: requests allowed per client per window (default: 100)
//! - `RATE_LIMIT_WINDOW_SECS`: quota window length in seconds (default: 60)
//! - `CORS_ORIGINS`: comma-separated allowed origins, or `*` (default: `*`)
//! - `ANALYTICS_BASE_URL`: upstream analytics service base URL; passthrough
//!   endpoints return 503 when unset
//! - `ANALYTICS_TIMEOUT_SECS`: upstream request timeout (default: 10)
//! - `RUST_LOG`: Logging level (default: "info")
//!
//! ## Example
//!
//! ```no_run
//! use contentpulse::config::Config;
//! use contentpulse::error::PlatformResult;
//!
//! # fn main() -> PlatformResult<()> {
//! let config = Config::from_env()?;
//! println!("Listening on port {}", config.port());
//! # Ok(())
//! # }
//! ```

use crate::error::{PlatformError, PlatformResult};
use std::env;
use std::time::Duration;

/// Main configuration struct for the platform.
///
/// Contains all runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    port: u16,

    /// Requests allowed per client key per quota window
    rate_limit_points: u32,

    /// Quota window length
    rate_limit_window: Duration,

    /// Allowed CORS origins; empty or `["*"]` means any origin
    cors_origins: Vec<String>,

    /// Base URL of the upstream analytics service, if configured
    analytics_base_url: Option<String>,

    /// Timeout for upstream analytics requests
    analytics_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This function:
    /// 1. Loads `.env` file using `dotenvy` (if present)
    /// 2. Reads all environment variables, applying defaults
    /// 3. Validates numeric values and the upstream URL
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A numeric variable fails to parse
    /// - `RATE_LIMIT_POINTS` or `RATE_LIMIT_WINDOW_SECS` is zero
    /// - `ANALYTICS_BASE_URL` is set but is not an http(s) URL
    pub fn from_env() -> PlatformResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        // Optional: listen port (default: 8080)
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| {
                PlatformError::config("PORT must be a valid port number", Some(Box::new(e)))
            })?;

        // Optional: quota points per window (default: 100)
        let rate_limit_points = env::var("RATE_LIMIT_POINTS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u32>()
            .map_err(|e| {
                PlatformError::config("RATE_LIMIT_POINTS must be a valid number", Some(Box::new(e)))
            })?;

        if rate_limit_points == 0 {
            return Err(PlatformError::config(
                "RATE_LIMIT_POINTS must be greater than zero",
                None,
            ));
        }

        // Optional: quota window in seconds (default: 60)
        let window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .map_err(|e| {
                PlatformError::config(
                    "RATE_LIMIT_WINDOW_SECS must be a valid number of seconds",
                    Some(Box::new(e)),
                )
            })?;

        if window_secs == 0 {
            return Err(PlatformError::config(
                "RATE_LIMIT_WINDOW_SECS must be greater than zero",
                None,
            ));
        }

        // Optional: CORS origins (default: any)
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // Optional: analytics upstream base URL (passthrough disabled when unset)
        let analytics_base_url = match env::var("ANALYTICS_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => {
                let url = url.trim().trim_end_matches('/').to_string();
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(PlatformError::config(
                        "ANALYTICS_BASE_URL must be an http(s) URL",
                        None,
                    ));
                }
                Some(url)
            }
            _ => None,
        };

        // Optional: analytics upstream timeout (default: 10 seconds)
        let analytics_timeout_secs = env::var("ANALYTICS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|e| {
                PlatformError::config(
                    "ANALYTICS_TIMEOUT_SECS must be a valid number of seconds",
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            port,
            rate_limit_points,
            rate_limit_window: Duration::from_secs(window_secs),
            cors_origins,
            analytics_base_url,
            analytics_timeout: Duration::from_secs(analytics_timeout_secs),
        })
    }

    /// HTTP listen port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Override the listen port. A CLI flag takes precedence over the
    /// environment.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Requests allowed per client key per quota window.
    #[must_use]
    pub fn rate_limit_points(&self) -> u32 {
        self.rate_limit_points
    }

    /// Quota window length.
    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        self.rate_limit_window
    }

    /// Allowed CORS origins.
    #[must_use]
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    /// Upstream analytics base URL, if passthrough is configured.
    #[must_use]
    pub fn analytics_base_url(&self) -> Option<&str> {
        self.analytics_base_url.as_deref()
    }

    /// Timeout for upstream analytics requests.
    #[must_use]
    pub fn analytics_timeout(&self) -> Duration {
        self.analytics_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that mutate process-wide environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("PORT");
        env::remove_var("RATE_LIMIT_POINTS");
        env::remove_var("RATE_LIMIT_WINDOW_SECS");
        env::remove_var("CORS_ORIGINS");
        env::remove_var("ANALYTICS_BASE_URL");
        env::remove_var("ANALYTICS_TIMEOUT_SECS");
    }

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();

        let config = Config::from_env();
        assert!(config.is_ok());

        if let Ok(config) = config {
            assert_eq!(config.port(), 8080);
            assert_eq!(config.rate_limit_points(), 100);
            assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
            assert!(config.analytics_base_url().is_none());
        }
    }

    #[test]
    fn test_config_rejects_zero_points() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        env::set_var("RATE_LIMIT_POINTS", "0");

        let result = Config::from_env();
        assert!(result.is_err());

        env::remove_var("RATE_LIMIT_POINTS");
    }

    #[test]
    fn test_config_rejects_invalid_port() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        env::set_var("PORT", "not-a-port");

        let result = Config::from_env();
        assert!(result.is_err());

        env::remove_var("PORT");
    }

    #[test]
    fn test_config_rejects_non_http_analytics_url() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        env::set_var("ANALYTICS_BASE_URL", "ftp://analytics.internal");

        let result = Config::from_env();
        assert!(result.is_err());

        env::remove_var("ANALYTICS_BASE_URL");
    }

    #[test]
    fn test_config_strips_trailing_slash_from_analytics_url() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        env::set_var("ANALYTICS_BASE_URL", "https://analytics.internal/");

        let config = Config::from_env();
        assert!(config.is_ok());

        if let Ok(config) = config {
            assert_eq!(
                config.analytics_base_url(),
                Some("https://analytics.internal")
            );
        }

        env::remove_var("ANALYTICS_BASE_URL");
    }
}
