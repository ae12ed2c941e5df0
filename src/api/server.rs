//! Axum server setup and routing.

use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{docs::ApiDoc, handlers, middleware as api_middleware};
use crate::app_state::AppState;

/// Build the application router with the full middleware stack.
///
/// Split out from [`run_server`] so integration tests can drive the exact
/// production pipeline without binding a socket.
pub fn build_router(state: AppState) -> Router {
    let limiter = state.limiter.clone();

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/experiments",
            post(handlers::experiments::create_experiment)
                .get(handlers::experiments::list_experiments),
        )
        .route(
            "/experiments/:id",
            get(handlers::experiments::get_experiment)
                .delete(handlers::experiments::delete_experiment),
        )
        .route(
            "/experiments/:id/status",
            patch(handlers::experiments::update_status),
        )
        .route(
            "/experiments/:id/variants/:key/impression",
            post(handlers::experiments::record_impression),
        )
        .route(
            "/experiments/:id/variants/:key/conversion",
            post(handlers::experiments::record_conversion),
        )
        .route(
            "/experiments/:id/results",
            get(handlers::experiments::get_results),
        )
        .route("/analytics/overview", get(handlers::analytics::get_overview))
        .route(
            "/analytics/search-terms",
            get(handlers::analytics::get_search_terms),
        );

    let cors = build_cors_layer(state.config.cors_origins());

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn(api_middleware::logging::log_requests))
        .layer(middleware::from_fn(move |req, next| {
            api_middleware::rate_limit::rate_limit(limiter.clone(), req, next)
        }));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api_routes)
        .layer(middleware_stack)
        .with_state(state)
}

/// Run the Axum API server.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let port = state.config.port();

    // One process-wide sweep reclaims quota records for keys that went
    // quiet; expiry itself is evaluated lazily on access
    let sweep_limiter = state.limiter.clone();
    let sweep_every = state.limiter.window();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweep_limiter.purge_expired();
        }
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let mut layer = CorsLayer::new();
        for origin in origins {
            if let Ok(header) = origin.parse::<HeaderValue>() {
                layer = layer.clone().allow_origin(header);
            }
        }
        layer
    }
}
