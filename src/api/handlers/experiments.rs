//! A/B experiment CRUD and counter endpoints.
//!
//! These handlers are a thin HTTP adaptation over
//! [`crate::experiments::ExperimentStore`]. Variant assignment and
//! statistical evaluation of the counters both live outside this service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::api::middleware::error::ApiError;
use crate::api::models::{
    CounterResponse, CreateExperimentRequest, ExperimentResponse, ResultsResponse,
    UpdateStatusRequest,
};
use crate::app_state::AppState;
use crate::experiments::VariantSpec;

#[utoipa::path(
    post,
    path = "/api/v1/experiments",
    request_body = CreateExperimentRequest,
    responses(
        (status = 201, description = "Experiment created", body = ExperimentResponse),
        (status = 400, description = "Invalid payload", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Create an experiment in draft status.
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_experiment(
    State(state): State<AppState>,
    Json(payload): Json<CreateExperimentRequest>,
) -> Result<(StatusCode, Json<ExperimentResponse>), ApiError> {
    let variants: Vec<VariantSpec> = payload.variants.into_iter().map(Into::into).collect();
    let experiment = state
        .experiments
        .create(&payload.name, payload.description, variants)?;

    info!(id = experiment.id, "Experiment created");
    Ok((StatusCode::CREATED, Json(experiment.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/experiments",
    responses(
        (status = 200, description = "All experiments", body = [ExperimentResponse])
    ),
    tag = "Experiments"
)]
/// List all experiments.
#[instrument(skip(state))]
pub async fn list_experiments(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExperimentResponse>>, ApiError> {
    let experiments = state
        .experiments
        .list()
        .into_iter()
        .map(ExperimentResponse::from)
        .collect();
    Ok(Json(experiments))
}

#[utoipa::path(
    get,
    path = "/api/v1/experiments/{id}",
    params(("id" = u64, Path, description = "Experiment id")),
    responses(
        (status = 200, description = "The experiment", body = ExperimentResponse),
        (status = 404, description = "Unknown experiment", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Fetch one experiment.
#[instrument(skip(state))]
pub async fn get_experiment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ExperimentResponse>, ApiError> {
    let experiment = state.experiments.get(id)?;
    Ok(Json(experiment.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/experiments/{id}/status",
    params(("id" = u64, Path, description = "Experiment id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated experiment", body = ExperimentResponse),
        (status = 404, description = "Unknown experiment", body = crate::api::models::ErrorResponse),
        (status = 409, description = "Illegal transition", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Transition an experiment's status. Completed is terminal.
#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ExperimentResponse>, ApiError> {
    let experiment = state.experiments.set_status(id, payload.status.into())?;
    info!(id, status = experiment.status.as_str(), "Experiment status changed");
    Ok(Json(experiment.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/experiments/{id}",
    params(("id" = u64, Path, description = "Experiment id")),
    responses(
        (status = 204, description = "Experiment deleted"),
        (status = 404, description = "Unknown experiment", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Delete an experiment.
#[instrument(skip(state))]
pub async fn delete_experiment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.experiments.delete(id)?;
    info!(id, "Experiment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/experiments/{id}/variants/{key}/impression",
    params(
        ("id" = u64, Path, description = "Experiment id"),
        ("key" = String, Path, description = "Variant key")
    ),
    responses(
        (status = 200, description = "Impression recorded", body = CounterResponse),
        (status = 404, description = "Unknown experiment or variant", body = crate::api::models::ErrorResponse),
        (status = 409, description = "Experiment not running", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Record one impression for a variant.
#[instrument(skip(state))]
pub async fn record_impression(
    State(state): State<AppState>,
    Path((id, key)): Path<(u64, String)>,
) -> Result<Json<CounterResponse>, ApiError> {
    let count = state.experiments.record_impression(id, &key)?;
    Ok(Json(CounterResponse {
        experiment_id: id,
        variant: key,
        count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/experiments/{id}/variants/{key}/conversion",
    params(
        ("id" = u64, Path, description = "Experiment id"),
        ("key" = String, Path, description = "Variant key")
    ),
    responses(
        (status = 200, description = "Conversion recorded", body = CounterResponse),
        (status = 404, description = "Unknown experiment or variant", body = crate::api::models::ErrorResponse),
        (status = 409, description = "Experiment not running", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Record one conversion for a variant.
#[instrument(skip(state))]
pub async fn record_conversion(
    State(state): State<AppState>,
    Path((id, key)): Path<(u64, String)>,
) -> Result<Json<CounterResponse>, ApiError> {
    let count = state.experiments.record_conversion(id, &key)?;
    Ok(Json(CounterResponse {
        experiment_id: id,
        variant: key,
        count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/experiments/{id}/results",
    params(("id" = u64, Path, description = "Experiment id")),
    responses(
        (status = 200, description = "Raw per-variant counts", body = ResultsResponse),
        (status = 404, description = "Unknown experiment", body = crate::api::models::ErrorResponse)
    ),
    tag = "Experiments"
)]
/// Raw per-variant results. Counts only; no significance computation.
#[instrument(skip(state))]
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let experiment = state.experiments.get(id)?;
    Ok(Json(experiment.into()))
}
