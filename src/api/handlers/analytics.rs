//! Analytics passthrough endpoints.
//!
//! These handlers forward report queries to the configured upstream
//! analytics service and relay its JSON response verbatim, status included.
//! No aggregation or computation happens in-process. When no upstream is
//! configured the endpoints answer 503.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

use crate::api::middleware::error::ApiError;
use crate::api::models::AnalyticsQuery;
use crate::app_state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/analytics/overview",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Upstream overview report"),
        (status = 502, description = "Upstream failure", body = crate::api::models::ErrorResponse),
        (status = 503, description = "Passthrough not configured", body = crate::api::models::ErrorResponse)
    ),
    tag = "Analytics"
)]
/// Traffic overview, relayed from the analytics upstream.
#[instrument(skip(state))]
pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Response, ApiError> {
    passthrough(&state, "/reports/overview", &query).await
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/search-terms",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Upstream search terms report"),
        (status = 502, description = "Upstream failure", body = crate::api::models::ErrorResponse),
        (status = 503, description = "Passthrough not configured", body = crate::api::models::ErrorResponse)
    ),
    tag = "Analytics"
)]
/// Search terms report, relayed from the analytics upstream.
#[instrument(skip(state))]
pub async fn get_search_terms(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Response, ApiError> {
    passthrough(&state, "/reports/search-terms", &query).await
}

/// Forward a report request to the upstream and relay status and body.
async fn passthrough(
    state: &AppState,
    path: &str,
    query: &AnalyticsQuery,
) -> Result<Response, ApiError> {
    let base = state.config.analytics_base_url().ok_or_else(|| {
        ApiError::ServiceUnavailable("analytics upstream is not configured".to_string())
    })?;

    let upstream = state
        .http_client
        .get(format!("{base}{path}"))
        .query(query)
        .send()
        .await
        .map_err(|e| ApiError::BadGateway(format!("analytics upstream unreachable: {e}")))?;

    let status = upstream.status().as_u16();
    let body: serde_json::Value = upstream
        .json()
        .await
        .map_err(|e| ApiError::BadGateway(format!("analytics upstream returned non-JSON: {e}")))?;

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(body)).into_response())
}
