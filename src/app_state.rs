//! Shared application state for the API server.

use std::sync::Arc;
use std::time::SystemTime;

use crate::config::Config;
use crate::error::PlatformResult;
use crate::experiments::ExperimentStore;
use crate::limiter::QuotaLimiter;

/// Shared application state for API handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// In-memory experiment store.
    pub experiments: Arc<ExperimentStore>,
    /// Per-client request quota limiter.
    pub limiter: QuotaLimiter,
    /// HTTP client for the analytics upstream.
    pub http_client: reqwest::Client,
    /// Application start time for uptime tracking.
    pub start_time: SystemTime,
}

impl AppState {
    /// Create a new `AppState` instance from loaded configuration.
    ///
    /// Builds the quota limiter from the configured points/window and the
    /// upstream HTTP client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns a config error if the HTTP client cannot be constructed.
    pub fn new(config: Config) -> PlatformResult<Self> {
        let limiter = QuotaLimiter::new(config.rate_limit_points(), config.rate_limit_window());

        let http_client = reqwest::Client::builder()
            .timeout(config.analytics_timeout())
            .build()
            .map_err(|e| {
                crate::error::PlatformError::config(
                    "failed to build upstream HTTP client",
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            config: Arc::new(config),
            experiments: Arc::new(ExperimentStore::new()),
            limiter,
            http_client,
            start_time: SystemTime::now(),
        })
    }
}
