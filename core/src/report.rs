//! Report data handed to the rendering layer.
//!
//! Field names here are the contract renderers depend on.

use crate::{
    analysis::CampaignAnalysis,
    forecast::ForecastResult,
    metrics::{ClassificationReport, RegressionMetrics},
    segmentation::SegmentInsight,
    simulation::AbTestResult,
    types::{CampaignRecord, CandidateCampaign, RunId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrivacyCompliance {
    pub handled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub run_id:             RunId,
    pub generated_at:       String,
    pub privacy_compliance: PrivacyCompliance,
    /// Historical success rate.
    pub conversion_rate:    f64,
    pub avg_order_value:    f64,
    pub analysis:           CampaignAnalysis,
    pub segments:           Vec<SegmentInsight>,
    pub response_report:    ClassificationReport,
    pub roi_metrics:        RegressionMetrics,
    pub ab_test:            AbTestResult,
    pub predicted_campaign: CandidateCampaign,
    pub forecast:           ForecastResult,
}

impl CampaignReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Mean revenue per targeted customer across the history: mean revenue over
/// mean target size. Zero for an empty history.
pub fn historical_avg_order_value(history: &[CampaignRecord]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let n = history.len() as f64;
    let mean_revenue = history.iter().map(|c| c.revenue).sum::<f64>() / n;
    let mean_size = history.iter().map(|c| c.target_size as f64).sum::<f64>() / n;
    if mean_size == 0.0 { 0.0 } else { mean_revenue / mean_size }
}
