//! Response model trainer: binary campaign success classifier.

use crate::{
    config::TrainingConfig,
    encoder::Schema,
    error::{PipelineError, PipelineResult},
    estimator::TrainedModel,
    forest::{ForestParams, RandomForestClassifier},
    metrics::ClassificationReport,
    training::{select, train_test_split, FeatureMatrix},
    types::CampaignRecord,
};

pub type ResponseModel = TrainedModel<RandomForestClassifier>;

/// Fit the response classifier on a seeded 80/20 split of `history` and
/// evaluate it on the held-out rows.
///
/// Fails with `PipelineError::Fit` when `history` is empty, carries a single
/// outcome class, or leaves the training partition without both classes.
pub fn train_response_model(
    history: &[CampaignRecord],
    config: &TrainingConfig,
) -> PipelineResult<(ResponseModel, ClassificationReport, Schema)> {
    let matrix = FeatureMatrix::from_history(history)?;
    let labels: Vec<bool> = history.iter().map(|c| c.success).collect();
    if !has_both_classes(&labels) {
        return Err(PipelineError::fit(
            "campaign history needs at least two distinct outcome classes",
        ));
    }

    let split = train_test_split(history.len(), config.test_fraction, config.seed);
    let train_labels = select(&labels, &split.train);
    if !has_both_classes(&train_labels) {
        return Err(PipelineError::fit(format!(
            "training partition of {} rows holds a single outcome class",
            split.train.len()
        )));
    }

    let params = ForestParams {
        n_trees:   config.forest_trees,
        max_depth: config.forest_max_depth,
        seed:      config.seed,
    };
    let forest = RandomForestClassifier::fit(
        &matrix.select(&split.train),
        &train_labels,
        &params,
        matrix.schema.fingerprint(),
    );

    let test_labels = select(&labels, &split.test);
    let predicted: Vec<bool> = matrix
        .select(&split.test)
        .iter()
        .map(|row| forest.predict(row))
        .collect();
    let report = ClassificationReport::from_predictions(&test_labels, &predicted);

    log::info!(
        "trained response model: {} features, {} train / {} test rows, accuracy {:.3}",
        matrix.schema.len(),
        split.train.len(),
        split.test.len(),
        report.accuracy,
    );

    let schema = matrix.schema;
    let model = TrainedModel::new(forest, schema.clone())?;
    Ok((model, report, schema))
}

fn has_both_classes(labels: &[bool]) -> bool {
    labels.iter().any(|&l| l) && labels.iter().any(|&l| !l)
}
