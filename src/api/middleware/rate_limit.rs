//! Request rate limiting middleware.
//!
//! Gates every inbound request through the per-client quota check before it
//! reaches a handler. Accepted requests pass through unmodified: quota
//! headers are only attached to rejections, and the asymmetry is
//! intentional and relied upon by clients.
//!
//! The client key is the caller's network address: the first hop of
//! `X-Forwarded-For` when a proxy supplied one, otherwise the peer socket
//! address. When neither is resolvable the request is accounted under the
//! shared [`ANONYMOUS_KEY`] bucket, so all unidentified clients compete for
//! one quota. A malformed forwarding header is not an error either: key
//! derivation degrades through the same fallbacks and the request proceeds
//! to the check.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::middleware::error::ApiError;
use crate::limiter::{QuotaDecision, QuotaLimiter, ANONYMOUS_KEY};

/// Derive the quota key for a request.
#[must_use]
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    if let Some(hop) = forwarded {
        return hop.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || ANONYMOUS_KEY.to_string(),
            |ConnectInfo(addr)| addr.ip().to_string(),
        )
}

/// Rate limiting middleware.
///
/// On exhaustion the pipeline halts here: the limiter produces the 429
/// response itself and no downstream handler runs.
pub async fn rate_limit(limiter: QuotaLimiter, request: Request, next: Next) -> Response {
    let key = client_key(&request);

    match limiter.consume(&key) {
        // Success path carries no quota headers
        QuotaDecision::Allowed => next.run(request).await,
        QuotaDecision::Rejected(exceeded) => {
            debug!(
                key = %key,
                retry_after_secs = exceeded.retry_after_secs(),
                "Request rejected by rate limiter"
            );
            ApiError::RateLimited {
                limit: limiter.limit(),
                exceeded,
            }
            .into_response()
        }
    }
}
