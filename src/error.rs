//! Error types for the content-marketing API platform.
//!
//! This module provides a unified error type [`PlatformError`] covering
//! configuration loading, request validation, the in-memory experiment
//! store, and the analytics upstream.
//!
//! # Design
//!
//! The error hierarchy is organized by layer:
//! - [`PlatformError::ConfigError`]: Configuration and environment issues
//! - [`PlatformError::ValidationError`]: Rejected request payloads
//! - [`PlatformError::NotFound`]: Missing experiments or variants
//! - [`PlatformError::InvalidState`]: Operations illegal in the current
//!   experiment status
//! - [`PlatformError::UpstreamError`]: Analytics passthrough failures
//!
//! All errors implement [`std::error::Error`] and include context via the
//! source error chain where one exists. Quota exhaustion is deliberately
//! NOT an error: it is an expected control-flow outcome modeled by
//! [`crate::limiter::QuotaDecision`] and handled entirely at the
//! middleware boundary.
//!
//! # Example
//!
//! ```
//! use contentpulse::error::{PlatformError, PlatformResult};
//!
//! fn validate_weight(weight: u32) -> PlatformResult<()> {
//!     if weight > 100 {
//!         return Err(PlatformError::validation("weight must be 0-100", None));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Result type alias using [`PlatformError`].
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Unified error type for the platform.
#[derive(Debug)]
pub enum PlatformError {
    /// Configuration or environment variable errors.
    ///
    /// Variants include:
    /// - Missing or invalid environment variables
    /// - Malformed port numbers or durations
    /// - Invalid upstream URLs
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Request payload failed validation.
    ///
    /// Variants include:
    /// - Empty experiment name
    /// - Fewer than two variants
    /// - Duplicate variant keys
    /// - Traffic weights not summing to 100
    ValidationError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced experiment or variant does not exist.
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// The operation is not legal in the experiment's current status.
    ///
    /// Counters only move while an experiment is running, and a completed
    /// experiment never leaves that status.
    InvalidState {
        /// Human-readable error message
        message: String,
    },

    /// Analytics upstream or network errors.
    ///
    /// Variants include:
    /// - Passthrough requested but no upstream configured
    /// - Connection or timeout failures reaching the upstream
    /// - Malformed upstream responses
    UpstreamError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlatformError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use contentpulse::error::PlatformError;
    ///
    /// let err = PlatformError::config("PORT must be a number", None);
    /// assert!(matches!(err, PlatformError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new validation error.
    #[must_use]
    pub fn validation(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ValidationError {
            message: message.into(),
            source,
        }
    }

    /// Create a new not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new invalid-state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a new upstream error.
    #[must_use]
    pub fn upstream(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::UpstreamError {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::ValidationError { message, .. } => write!(f, "Validation error: {message}"),
            Self::NotFound { message } => write!(f, "Not found: {message}"),
            Self::InvalidState { message } => write!(f, "Invalid state: {message}"),
            Self::UpstreamError { message, .. } => write!(f, "Upstream error: {message}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::ValidationError { source, .. }
            | Self::UpstreamError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::NotFound { .. } | Self::InvalidState { .. } => None,
        }
    }
}

/// Convert from `reqwest::Error` to [`PlatformError`].
///
/// Passthrough requests are the only place the platform performs network
/// I/O, so transport failures are categorized as upstream errors.
impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
