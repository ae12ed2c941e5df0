//! In-memory store for A/B experiments and their content variants.
//!
//! The store owns every experiment for the lifetime of the process. It is
//! deliberately not persistent: restarting the server discards all
//! experiments and counters. Impression and conversion counts are raw
//! tallies only; no significance testing and no traffic-allocation
//! algorithm lives here. Both are the job of a downstream consumer of the
//! results endpoint.
//!
//! Mutations go through the concurrent map's entry guard, so counter
//! increments from overlapping requests never lose updates.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::{PlatformError, PlatformResult};

/// Lifecycle status of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentStatus {
    /// Being set up; not yet collecting data.
    Draft,
    /// Live; impressions and conversions are accepted.
    Running,
    /// Temporarily halted; counters are frozen.
    Paused,
    /// Finished. Terminal: a completed experiment never changes status again.
    Completed,
}

impl ExperimentStatus {
    /// Stable lowercase name used in API payloads and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

/// One content variant inside an experiment.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Key unique within the experiment (e.g. "control", "headline-b").
    pub key: String,
    /// Display name.
    pub name: String,
    /// Traffic weight in percent (0-100).
    pub weight: u32,
    /// Times this variant was shown.
    pub impressions: u64,
    /// Times this variant converted.
    pub conversions: u64,
}

/// A single A/B experiment.
#[derive(Debug, Clone)]
pub struct Experiment {
    /// Server-assigned identifier.
    pub id: u64,
    /// Experiment name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Current lifecycle status.
    pub status: ExperimentStatus,
    /// Content variants under test.
    pub variants: Vec<Variant>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input shape for a variant at experiment creation.
#[derive(Debug, Clone)]
pub struct VariantSpec {
    /// Key unique within the experiment.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Traffic weight in percent (0-100).
    pub weight: u32,
}

/// Process-local experiment store.
///
/// Cheap interior mutability via a concurrent map; an instance is
/// constructed once at start-up and shared through application state.
#[derive(Debug)]
pub struct ExperimentStore {
    experiments: DashMap<u64, Experiment>,
    next_id: AtomicU64,
}

impl Default for ExperimentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            experiments: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create an experiment in `Draft` status.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty, fewer than two
    /// variants are given, a variant key is empty or duplicated, or the
    /// traffic weights do not sum to 100.
    pub fn create(
        &self,
        name: &str,
        description: Option<String>,
        variants: Vec<VariantSpec>,
    ) -> PlatformResult<Experiment> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlatformError::validation(
                "experiment name must not be empty",
                None,
            ));
        }
        if variants.len() < 2 {
            return Err(PlatformError::validation(
                "an experiment needs at least two variants",
                None,
            ));
        }
        for spec in &variants {
            if spec.key.trim().is_empty() {
                return Err(PlatformError::validation(
                    "variant keys must not be empty",
                    None,
                ));
            }
        }
        for (i, spec) in variants.iter().enumerate() {
            if variants[..i].iter().any(|other| other.key == spec.key) {
                return Err(PlatformError::validation(
                    format!("duplicate variant key '{}'", spec.key),
                    None,
                ));
            }
        }
        let weight_sum: u32 = variants.iter().map(|spec| spec.weight).sum();
        if weight_sum != 100 {
            return Err(PlatformError::validation(
                format!("variant weights must sum to 100, got {weight_sum}"),
                None,
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let experiment = Experiment {
            id,
            name: name.to_string(),
            description,
            status: ExperimentStatus::Draft,
            variants: variants
                .into_iter()
                .map(|spec| Variant {
                    key: spec.key,
                    name: spec.name,
                    weight: spec.weight,
                    impressions: 0,
                    conversions: 0,
                })
                .collect(),
            created_at: Utc::now(),
        };

        self.experiments.insert(id, experiment.clone());
        Ok(experiment)
    }

    /// All experiments, ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<Experiment> {
        let mut all: Vec<Experiment> = self
            .experiments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|experiment| experiment.id);
        all
    }

    /// Fetch one experiment by id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn get(&self, id: u64) -> PlatformResult<Experiment> {
        self.experiments
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PlatformError::not_found(format!("experiment {id}")))
    }

    /// Transition an experiment to a new status.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id, or an invalid-state
    /// error when trying to move a completed experiment.
    pub fn set_status(&self, id: u64, status: ExperimentStatus) -> PlatformResult<Experiment> {
        let mut entry = self
            .experiments
            .get_mut(&id)
            .ok_or_else(|| PlatformError::not_found(format!("experiment {id}")))?;

        if entry.status == ExperimentStatus::Completed && status != ExperimentStatus::Completed {
            return Err(PlatformError::invalid_state(format!(
                "experiment {id} is completed and cannot move to {}",
                status.as_str()
            )));
        }

        entry.status = status;
        Ok(entry.clone())
    }

    /// Delete an experiment.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn delete(&self, id: u64) -> PlatformResult<()> {
        self.experiments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PlatformError::not_found(format!("experiment {id}")))
    }

    /// Record one impression for a variant. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown experiment or variant key,
    /// or an invalid-state error when the experiment is not running.
    pub fn record_impression(&self, id: u64, variant_key: &str) -> PlatformResult<u64> {
        self.record(id, variant_key, |variant| {
            variant.impressions += 1;
            variant.impressions
        })
    }

    /// Record one conversion for a variant. Returns the new count.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::record_impression`].
    pub fn record_conversion(&self, id: u64, variant_key: &str) -> PlatformResult<u64> {
        self.record(id, variant_key, |variant| {
            variant.conversions += 1;
            variant.conversions
        })
    }

    /// Number of experiments currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    fn record(
        &self,
        id: u64,
        variant_key: &str,
        update: impl FnOnce(&mut Variant) -> u64,
    ) -> PlatformResult<u64> {
        let mut entry = self
            .experiments
            .get_mut(&id)
            .ok_or_else(|| PlatformError::not_found(format!("experiment {id}")))?;

        if entry.status != ExperimentStatus::Running {
            return Err(PlatformError::invalid_state(format!(
                "experiment {id} is {}, counters only move while running",
                entry.status.as_str()
            )));
        }

        let variant = entry
            .variants
            .iter_mut()
            .find(|variant| variant.key == variant_key)
            .ok_or_else(|| {
                PlatformError::not_found(format!("variant '{variant_key}' in experiment {id}"))
            })?;

        Ok(update(variant))
    }
}
