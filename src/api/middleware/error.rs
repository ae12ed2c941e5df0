//! Unified API error handling.

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use tracing::error;

use crate::api::models::ErrorResponse;
use crate::error::PlatformError;
use crate::limiter::QuotaExceeded;

/// API-specific error type.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Invalid request parameters.
    BadRequest(String),
    /// Operation conflicts with the resource's current state.
    Conflict(String),
    /// Per-client request quota exhausted.
    RateLimited {
        /// Configured points per window, for the `X-RateLimit-Limit` header.
        limit: u32,
        /// Rejection details from the quota limiter.
        exceeded: QuotaExceeded,
    },
    /// A required upstream is not configured.
    ServiceUnavailable(String),
    /// The upstream failed or returned garbage.
    BadGateway(String),
    /// Internal server error.
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // Quota rejections carry their own header contract
            Self::RateLimited { limit, exceeded } => {
                return rate_limited_response(limit, &exceeded)
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            Self::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            Self::BadGateway(msg) => {
                error!(error = %msg, "Analytics upstream failure");
                (StatusCode::BAD_GATEWAY, "bad_gateway", msg)
            }
            Self::InternalError(msg) => {
                error!(error = %msg, "Internal error in API handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

/// Build the 429 response for an exhausted quota.
///
/// Headers are set on the response before the body is written:
/// - `Retry-After`: seconds until retrying makes sense, never below 1
/// - `X-RateLimit-Limit`: configured points per window
/// - `X-RateLimit-Remaining`: points left after the failed attempt
/// - `X-RateLimit-Reset`: ISO-8601 UTC time at which the window resets
fn rate_limited_response(limit: u32, exceeded: &QuotaExceeded) -> Response {
    let reset_at = Utc::now()
        + chrono::Duration::milliseconds(
            i64::try_from(exceeded.ms_before_next).unwrap_or(i64::MAX),
        );

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse {
            error: "Too many requests".to_string(),
            message: "Rate limit exceeded. Please try again later.".to_string(),
            details: None,
        }),
    )
        .into_response();

    let headers = response.headers_mut();
    insert_header(
        headers,
        header::RETRY_AFTER,
        &exceeded.retry_after_secs().to_string(),
    );
    insert_header(
        headers,
        HeaderName::from_static("x-ratelimit-limit"),
        &limit.to_string(),
    );
    insert_header(
        headers,
        HeaderName::from_static("x-ratelimit-remaining"),
        &exceeded.remaining_points.to_string(),
    );
    insert_header(
        headers,
        HeaderName::from_static("x-ratelimit-reset"),
        &reset_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    response
}

fn insert_header(
    headers: &mut axum::http::HeaderMap,
    name: impl axum::http::header::IntoHeaderName,
    value: &str,
) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::ValidationError { message, .. } => Self::BadRequest(message),
            PlatformError::NotFound { message } => Self::NotFound(message),
            PlatformError::InvalidState { message } => Self::Conflict(message),
            PlatformError::UpstreamError { message, .. } => Self::BadGateway(message),
            PlatformError::ConfigError { message, .. } => Self::InternalError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_response_contract() {
        let exceeded = QuotaExceeded {
            remaining_points: 0,
            ms_before_next: 32_500,
        };

        let response = rate_limited_response(100, &exceeded);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let headers = response.headers();
        assert_eq!(
            headers.get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("33")
        );
        assert_eq!(
            headers
                .get("x-ratelimit-limit")
                .and_then(|v| v.to_str().ok()),
            Some("100")
        );
        assert_eq!(
            headers
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok()),
            Some("0")
        );
        // Reset header must parse back as an RFC 3339 timestamp
        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| chrono::DateTime::parse_from_rfc3339(v).ok());
        assert!(reset.is_some());
    }

    #[test]
    fn test_retry_after_never_zero() {
        let exceeded = QuotaExceeded {
            remaining_points: 0,
            ms_before_next: 0,
        };

        let response = rate_limited_response(100, &exceeded);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
            Some("1")
        );
    }

    #[test]
    fn test_platform_error_mapping() {
        let api: ApiError = PlatformError::not_found("experiment 7").into();
        assert!(matches!(api, ApiError::NotFound(_)));

        let api: ApiError = PlatformError::invalid_state("completed").into();
        assert!(matches!(api, ApiError::Conflict(_)));

        let api: ApiError = PlatformError::validation("bad weights", None).into();
        assert!(matches!(api, ApiError::BadRequest(_)));
    }
}
