//! Integration tests for the A/B experiment endpoints.

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

fn json_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json body")
}

fn create_payload() -> serde_json::Value {
    serde_json::json!({
        "name": "Hero headline",
        "description": "Testing two headline variants on the landing page",
        "variants": [
            {"key": "control", "name": "Current headline", "weight": 50},
            {"key": "punchy", "name": "Punchy headline", "weight": 50}
        ]
    })
}

#[tokio::test]
async fn test_create_and_fetch_experiment() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments",
            Some(create_payload()),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = response_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["status"], "draft");
    assert_eq!(created["variants"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(json_request("GET", "/api/v1/experiments/1", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = response_json(response).await;
    assert_eq!(fetched["name"], "Hero headline");
}

#[tokio::test]
async fn test_create_rejects_bad_weights() {
    let app = test_app();

    let payload = serde_json::json!({
        "name": "Broken",
        "variants": [
            {"key": "a", "name": "A", "weight": 70},
            {"key": "b", "name": "B", "weight": 50}
        ]
    });
    let response = app
        .oneshot(json_request("POST", "/api/v1/experiments", Some(payload)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_unknown_experiment_is_404() {
    let app = test_app();

    let response = app
        .oneshot(json_request("GET", "/api/v1/experiments/999", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_counter_lifecycle_and_results() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments",
            Some(create_payload()),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Counters are frozen while the experiment is a draft
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments/1/variants/control/impression",
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Start the experiment
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/experiments/1/status",
            Some(serde_json::json!({"status": "running"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..4 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/experiments/1/variants/control/impression",
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments/1/variants/control/conversion",
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/v1/experiments/1/results", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let results = response_json(response).await;
    let control = &results["variants"][0];
    assert_eq!(control["key"], "control");
    assert_eq!(control["impressions"], 4);
    assert_eq!(control["conversions"], 1);
    assert!((control["conversion_rate"].as_f64().unwrap() - 0.25).abs() < f64::EPSILON);

    // Unknown variant key on a running experiment
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments/1/variants/nope/impression",
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_completed_experiments_cannot_be_restarted() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments",
            Some(create_payload()),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/experiments/1/status",
            Some(serde_json::json!({"status": "completed"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/experiments/1/status",
            Some(serde_json::json!({"status": "running"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_experiment() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/experiments",
            Some(create_payload()),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("DELETE", "/api/v1/experiments/1", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request("GET", "/api/v1/experiments/1", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
