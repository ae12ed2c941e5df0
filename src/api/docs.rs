//! OpenAPI documentation for the REST API.

use utoipa::OpenApi;

use crate::api::handlers;

/// OpenAPI documentation for the REST API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::experiments::create_experiment,
        handlers::experiments::list_experiments,
        handlers::experiments::get_experiment,
        handlers::experiments::update_status,
        handlers::experiments::delete_experiment,
        handlers::experiments::record_impression,
        handlers::experiments::record_conversion,
        handlers::experiments::get_results,
        handlers::analytics::get_overview,
        handlers::analytics::get_search_terms,
    ),
    components(schemas(
        crate::api::models::HealthResponse,
        crate::api::models::CreateExperimentRequest,
        crate::api::models::VariantPayload,
        crate::api::models::UpdateStatusRequest,
        crate::api::models::StatusPayload,
        crate::api::models::ExperimentResponse,
        crate::api::models::VariantResponse,
        crate::api::models::CounterResponse,
        crate::api::models::ResultsResponse,
        crate::api::models::VariantResults,
        crate::api::models::ErrorResponse,
    )),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Experiments", description = "A/B experiment management"),
        (name = "Analytics", description = "Analytics passthrough"),
    ),
    info(
        title = "Contentpulse API",
        version = "1.0.0",
        description = "Content-marketing platform API: A/B experiments, analytics passthrough, per-client rate limiting",
    )
)]
pub struct ApiDoc;
