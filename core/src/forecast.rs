//! Forecast engine: scores one candidate campaign with two models.
//!
//! The candidate is encoded separately against each model's own schema;
//! the schemas may legitimately differ. The composite verdict is:
//!
//!   predicted_success = p > policy.min_success_probability
//!                    && roi > policy.min_roi
//!
//! Both comparisons are strict.

use crate::{
    config::ForecastPolicy,
    encoder::{encode_for_schema, RawRecord, Schema},
    error::PipelineResult,
    estimator::{check_pairing, PointEstimator, ProbabilityEstimator},
    response_model::ResponseModel,
    roi_model::RoiModel,
    types::CandidateCampaign,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub success_probability: f64,
    pub predicted_roi:       f64,
    pub predicted_success:   bool,
}

/// Forecast `candidate` with explicitly paired models and schemas.
///
/// Fails with `ModelSchemaMismatch` when a schema is not the one its model
/// was trained against. Unknown categories never fail.
pub fn forecast<R, I>(
    candidate: &CandidateCampaign,
    response_model: &R,
    response_schema: &Schema,
    roi_model: &I,
    roi_schema: &Schema,
    policy: &ForecastPolicy,
) -> PipelineResult<ForecastResult>
where
    R: ProbabilityEstimator + ?Sized,
    I: PointEstimator + ?Sized,
{
    check_pairing(response_model, response_schema)?;
    check_pairing(roi_model, roi_schema)?;

    let record = RawRecord::from(candidate);
    let response_row = encode_for_schema(&record, response_schema);
    let roi_row = encode_for_schema(&record, roi_schema);

    let success_probability = response_model.predict_proba(&response_row).clamp(0.0, 1.0);
    let predicted_roi = roi_model.predict(&roi_row);

    Ok(ForecastResult {
        success_probability,
        predicted_roi,
        predicted_success: verdict(success_probability, predicted_roi, policy),
    })
}

/// Forecast with trained (model, schema) units.
pub fn forecast_with_models(
    candidate: &CandidateCampaign,
    response: &ResponseModel,
    roi: &RoiModel,
    policy: &ForecastPolicy,
) -> PipelineResult<ForecastResult> {
    forecast(
        candidate,
        response.estimator(),
        response.schema(),
        roi.estimator(),
        roi.schema(),
        policy,
    )
}

/// The composite decision rule.
pub fn verdict(success_probability: f64, predicted_roi: f64, policy: &ForecastPolicy) -> bool {
    success_probability > policy.min_success_probability && predicted_roi > policy.min_roi
}
