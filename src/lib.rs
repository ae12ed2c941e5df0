//! # Contentpulse
//!
//! Content-marketing API platform: A/B experiments, analytics passthrough,
//! and per-client request rate limiting.
//!
//! ## Features
//!
//! - **Per-client rate limiting** with fixed-window quota accounting and
//!   standard `Retry-After` / `X-RateLimit-*` rejection headers
//! - **A/B experiment endpoints**: variant CRUD plus impression/conversion
//!   counters (raw counts only; statistical evaluation is downstream)
//! - **Analytics passthrough** to a configured upstream reporting service
//! - **Production error handling** with unified `PlatformError`
//! - **Structured logging** with tracing (pretty, JSON, rotating file)
//! - **OpenAPI documentation** served at `/swagger-ui`
//!
//! ## Architecture
//!
//! The crate is organized into independent layers:
//!
//! 1. **Config Layer** ([`config`]) - Environment variable loading
//! 2. **Limiter Layer** ([`limiter`]) - Per-key quota accounting
//! 3. **Experiments Layer** ([`experiments`]) - In-memory A/B store
//! 4. **API Layer** ([`api`]) - Axum routing, middleware, handlers
//! 5. **CLI Layer** ([`cli`]) - Command dispatch
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the server
//! cargo run --release -- serve
//!
//! # Validate configuration
//! cargo run --release -- check-config
//! ```
//!
//! ## Rate limiting behavior
//!
//! Every request under `/api/v1` consumes one point from the caller's
//! quota (default 100 points per 60 seconds, keyed by client address).
//! Accepted requests pass through untouched; rejected requests receive
//! `429` with `Retry-After`, `X-RateLimit-Limit`, `X-RateLimit-Remaining`,
//! and `X-RateLimit-Reset` headers. Quota state is process-local and
//! in-memory: a restart resets all quotas, and horizontally scaled
//! deployments need an externalized store.
//!
//! ## Error Handling
//!
//! All fallible operations return [`error::PlatformResult<T>`](error::PlatformResult)
//! for consistent propagation:
//!
//! ```rust
//! use contentpulse::error::{PlatformError, PlatformResult};
//!
//! fn example() -> PlatformResult<()> {
//!     // Operations that can fail return PlatformResult
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! # All tests
//! cargo test
//!
//! # Unit tests only
//! cargo test --lib
//!
//! # Integration tests
//! cargo test --test '*'
//! ```
//!
//! ## License
//!
//! Licensed under either of MIT or Apache-2.0, at your option.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod app_state;
pub mod cli;
pub mod config;
pub mod error;
pub mod experiments;
pub mod limiter;
pub mod observability;
