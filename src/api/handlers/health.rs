//! Health check endpoint.

use axum::{extract::State, Json};
use std::time::SystemTime;
use tracing::instrument;

use crate::api::middleware::error::ApiError;
use crate::api::models::HealthResponse;
use crate::app_state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
/// Returns service health information for the admin dashboard widgets.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let uptime = SystemTime::now()
        .duration_since(state.start_time)
        .unwrap_or_default()
        .as_secs();

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        experiments: state.experiments.len(),
        tracked_quota_keys: state.limiter.tracked_keys(),
        analytics_configured: state.config.analytics_base_url().is_some(),
    }))
}
