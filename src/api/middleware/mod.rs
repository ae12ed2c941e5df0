//! Middleware for the HTTP pipeline.

pub mod error;
pub mod logging;
pub mod rate_limit;
