//! Integration tests for the health endpoint and analytics passthrough.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use contentpulse::api::server::build_router;
use contentpulse::app_state::AppState;
use contentpulse::config::Config;

fn test_app() -> axum::Router {
    let state = AppState::new(Config::from_env().expect("config")).expect("state");
    build_router(state)
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json body")
}

#[tokio::test]
async fn test_health_reports_service_gauges() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let health = response_json(response).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(health["experiments"], 0);
    assert_eq!(health["analytics_configured"], false);
    assert!(health["uptime_seconds"].is_u64());
    // The health request itself holds a quota record by now
    assert!(health["tracked_quota_keys"].is_u64());
}

#[tokio::test]
async fn test_analytics_passthrough_unconfigured_is_503() {
    // No ANALYTICS_BASE_URL in the test environment
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/analytics/overview?start=2026-01-01&end=2026-01-31")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = response_json(response).await;
    assert_eq!(body["error"], "service_unavailable");
}

#[tokio::test]
async fn test_search_terms_passthrough_unconfigured_is_503() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/analytics/search-terms?limit=25")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
