//! The pipeline event log.
//!
//! RULE: Every stage that changes persisted state or produces a result
//! records one event. Variants are appended, never removed or reordered.

use crate::{simulation::Variant, types::RunId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    // ── Run ────────────────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed:   u64,
    },

    // ── Data ───────────────────────────────────────
    CustomersPrepared {
        received: usize,
        kept:     usize,
    },
    CustomersSegmented {
        customers: usize,
        clusters:  usize,
        inertia:   f64,
    },
    CampaignsAnalyzed {
        campaigns:    usize,
        success_rate: f64,
        avg_roi:      f64,
    },

    // ── Models ─────────────────────────────────────
    ModelTrained {
        kind:     String,
        features: usize,
        schema:   String, // hex fingerprint
        score:    f64,    // accuracy or r²
    },
    ArtifactSaved {
        kind: String,
    },

    // ── Results ────────────────────────────────────
    AbTestCompleted {
        segment:     u32,
        winner:      Variant,
        p_value:     f64,
        significant: bool,
    },
    ForecastProduced {
        success_probability: f64,
        predicted_roi:       f64,
        predicted_success:   bool,
    },
}

impl PipelineEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }     => "run_initialized",
            Self::CustomersPrepared { .. }  => "customers_prepared",
            Self::CustomersSegmented { .. } => "customers_segmented",
            Self::CampaignsAnalyzed { .. }  => "campaigns_analyzed",
            Self::ModelTrained { .. }       => "model_trained",
            Self::ArtifactSaved { .. }      => "artifact_saved",
            Self::AbTestCompleted { .. }    => "ab_test_completed",
            Self::ForecastProduced { .. }   => "forecast_produced",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub stage:      String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized PipelineEvent
}
