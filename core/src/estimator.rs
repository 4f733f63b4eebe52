//! Estimator contracts and the (model, schema) pairing.
//!
//! RULE: A fitted estimator is only meaningful under the schema it was
//! trained against. Every estimator records that schema's width and
//! fingerprint; `check_pairing` refuses any other schema.

use crate::{
    encoder::Schema,
    error::{PipelineError, PipelineResult},
};
use serde::{Deserialize, Serialize};

/// What every fitted estimator knows about its training schema.
pub trait Estimator {
    /// Stable name used in errors and artifact rows.
    fn kind(&self) -> &'static str;

    /// Width of the feature vectors the estimator was fitted on.
    fn feature_count(&self) -> usize;

    /// `Schema::fingerprint` of the training schema.
    fn schema_fingerprint(&self) -> u64;
}

/// Binary classifier exposing the positive-class probability.
pub trait ProbabilityEstimator: Estimator {
    fn predict_proba(&self, row: &[f64]) -> f64;
}

/// Regressor exposing a point estimate.
pub trait PointEstimator: Estimator {
    fn predict(&self, row: &[f64]) -> f64;
}

/// Refuse to pair `model` with a schema it was not trained against.
pub fn check_pairing<E: Estimator + ?Sized>(model: &E, schema: &Schema) -> PipelineResult<()> {
    if model.feature_count() != schema.len() {
        return Err(PipelineError::ModelSchemaMismatch {
            model:    model.kind(),
            expected: format!("{} features", model.feature_count()),
            actual:   format!("{} features", schema.len()),
        });
    }
    if model.schema_fingerprint() != schema.fingerprint() {
        return Err(PipelineError::ModelSchemaMismatch {
            model:    model.kind(),
            expected: format!("schema {:016x}", model.schema_fingerprint()),
            actual:   format!("schema {:016x}", schema.fingerprint()),
        });
    }
    Ok(())
}

/// A fitted estimator together with the schema it owns.
/// The two halves are constructed, stored and loaded together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel<M> {
    schema:    Schema,
    estimator: M,
}

impl<M: Estimator> TrainedModel<M> {
    /// Pair an estimator with its schema, verifying they belong together.
    pub fn new(estimator: M, schema: Schema) -> PipelineResult<Self> {
        check_pairing(&estimator, &schema)?;
        Ok(Self { schema, estimator })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn estimator(&self) -> &M {
        &self.estimator
    }

    pub fn into_parts(self) -> (M, Schema) {
        (self.estimator, self.schema)
    }
}
