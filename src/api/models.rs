//! API request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::experiments::{Experiment, ExperimentStatus, Variant, VariantSpec};

/// Structured error payload returned by all failing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Health response for the admin dashboard status widgets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since process start
    pub uptime_seconds: u64,
    /// Number of experiments in the store
    pub experiments: usize,
    /// Number of client keys currently holding a quota record
    pub tracked_quota_keys: usize,
    /// Whether the analytics passthrough upstream is configured
    pub analytics_configured: bool,
}

/// Request body for creating an experiment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateExperimentRequest {
    /// Experiment name
    pub name: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Content variants under test (at least two)
    pub variants: Vec<VariantPayload>,
}

/// One variant in a create request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariantPayload {
    /// Key unique within the experiment
    pub key: String,
    /// Display name
    pub name: String,
    /// Traffic weight in percent; weights must sum to 100
    pub weight: u32,
}

impl From<VariantPayload> for VariantSpec {
    fn from(payload: VariantPayload) -> Self {
        Self {
            key: payload.key,
            name: payload.name,
            weight: payload.weight,
        }
    }
}

/// Request body for a status transition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status
    pub status: StatusPayload,
}

/// Experiment status as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusPayload {
    /// Being set up
    Draft,
    /// Live
    Running,
    /// Temporarily halted
    Paused,
    /// Finished (terminal)
    Completed,
}

impl From<StatusPayload> for ExperimentStatus {
    fn from(payload: StatusPayload) -> Self {
        match payload {
            StatusPayload::Draft => Self::Draft,
            StatusPayload::Running => Self::Running,
            StatusPayload::Paused => Self::Paused,
            StatusPayload::Completed => Self::Completed,
        }
    }
}

/// Full experiment representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExperimentResponse {
    /// Server-assigned identifier
    pub id: u64,
    /// Experiment name
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status
    pub status: String,
    /// Content variants
    pub variants: Vec<VariantResponse>,
    /// Creation time (ISO 8601)
    pub created_at: DateTime<Utc>,
}

/// Variant representation with counters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariantResponse {
    /// Variant key
    pub key: String,
    /// Display name
    pub name: String,
    /// Traffic weight in percent
    pub weight: u32,
    /// Impression count
    pub impressions: u64,
    /// Conversion count
    pub conversions: u64,
}

impl From<&Variant> for VariantResponse {
    fn from(variant: &Variant) -> Self {
        Self {
            key: variant.key.clone(),
            name: variant.name.clone(),
            weight: variant.weight,
            impressions: variant.impressions,
            conversions: variant.conversions,
        }
    }
}

impl From<Experiment> for ExperimentResponse {
    fn from(experiment: Experiment) -> Self {
        Self {
            id: experiment.id,
            name: experiment.name,
            description: experiment.description,
            status: experiment.status.as_str().to_string(),
            variants: experiment.variants.iter().map(VariantResponse::from).collect(),
            created_at: experiment.created_at,
        }
    }
}

/// Response after recording an impression or conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CounterResponse {
    /// Experiment identifier
    pub experiment_id: u64,
    /// Variant key
    pub variant: String,
    /// Updated counter value
    pub count: u64,
}

/// Raw per-variant results for an experiment.
///
/// Counts only; significance testing is a downstream concern.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResultsResponse {
    /// Experiment identifier
    pub experiment_id: u64,
    /// Experiment name
    pub name: String,
    /// Lifecycle status
    pub status: String,
    /// Per-variant tallies
    pub variants: Vec<VariantResults>,
}

/// Tallies for one variant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariantResults {
    /// Variant key
    pub key: String,
    /// Display name
    pub name: String,
    /// Impression count
    pub impressions: u64,
    /// Conversion count
    pub conversions: u64,
    /// conversions / impressions, or 0 when no impressions
    pub conversion_rate: f64,
}

impl From<Experiment> for ResultsResponse {
    fn from(experiment: Experiment) -> Self {
        Self {
            experiment_id: experiment.id,
            name: experiment.name,
            status: experiment.status.as_str().to_string(),
            variants: experiment
                .variants
                .iter()
                .map(|variant| {
                    #[allow(clippy::cast_precision_loss)]
                    let conversion_rate = if variant.impressions == 0 {
                        0.0
                    } else {
                        variant.conversions as f64 / variant.impressions as f64
                    };
                    VariantResults {
                        key: variant.key.clone(),
                        name: variant.name.clone(),
                        impressions: variant.impressions,
                        conversions: variant.conversions,
                        conversion_rate,
                    }
                })
                .collect(),
        }
    }
}

/// Query parameters forwarded to the analytics upstream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct AnalyticsQuery {
    /// Start date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Maximum number of rows to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
