//! ROI model trainer: continuous return regressor.
//!
//! The schema is rebuilt from `history` here rather than borrowed from the
//! response model; the two are never assumed identical.

use crate::{
    boosting::{BoostingParams, GradientBoostingRegressor},
    config::TrainingConfig,
    encoder::Schema,
    error::{PipelineError, PipelineResult},
    estimator::{PointEstimator, TrainedModel},
    metrics::RegressionMetrics,
    training::{select, train_test_split, FeatureMatrix},
    types::CampaignRecord,
};

pub type RoiModel = TrainedModel<GradientBoostingRegressor>;

pub fn train_roi_model(
    history: &[CampaignRecord],
    config: &TrainingConfig,
) -> PipelineResult<(RoiModel, RegressionMetrics, Schema)> {
    let matrix = FeatureMatrix::from_history(history)?;
    let targets: Vec<f64> = history.iter().map(|c| c.roi).collect();

    let split = train_test_split(history.len(), config.test_fraction, config.seed);
    if split.train.is_empty() {
        return Err(PipelineError::fit(format!(
            "{} campaigns leave no rows for training",
            history.len()
        )));
    }

    let params = BoostingParams {
        n_stages:      config.boosting_stages,
        learning_rate: config.boosting_learning_rate,
        max_depth:     config.boosting_max_depth,
        seed:          config.seed,
    };
    let regressor = GradientBoostingRegressor::fit(
        &matrix.select(&split.train),
        &select(&targets, &split.train),
        &params,
        matrix.schema.fingerprint(),
    );

    let predicted: Vec<f64> = matrix
        .select(&split.test)
        .iter()
        .map(|row| regressor.predict(row))
        .collect();
    let metrics = RegressionMetrics::from_predictions(&select(&targets, &split.test), &predicted);

    log::info!(
        "trained ROI model: {} features, {} stages, r2 {:.3}, mae {:.3}",
        matrix.schema.len(),
        regressor.n_stages(),
        metrics.r_squared,
        metrics.mean_absolute_error,
    );

    let schema = matrix.schema;
    let model = TrainedModel::new(regressor, schema.clone())?;
    Ok((model, metrics, schema))
}
