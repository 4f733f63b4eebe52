//! Gradient-boosted regression trees with squared loss.
//!
//! F0 = mean(y); each stage fits a shallow tree to the residuals and adds
//! `learning_rate` times its prediction.

use crate::{
    estimator::{Estimator, PointEstimator},
    rng::{StageRng, StageSlot},
    tree::{RegressionTree, TreeParams},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct BoostingParams {
    pub n_stages:      usize,
    pub learning_rate: f64,
    pub max_depth:     usize,
    pub seed:          u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    init:               f64,
    learning_rate:      f64,
    stages:             Vec<RegressionTree>,
    n_features:         usize,
    schema_fingerprint: u64,
}

impl GradientBoostingRegressor {
    /// Fit on `x` against `y`. Callers guarantee `x` is non-empty.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &BoostingParams, schema_fingerprint: u64) -> Self {
        let n = x.len();
        let n_features = x.first().map_or(0, |r| r.len());
        let init = y.iter().sum::<f64>() / n.max(1) as f64;
        let tree_params = TreeParams {
            max_depth: Some(params.max_depth),
            ..TreeParams::default()
        };
        let rows: Vec<usize> = (0..n).collect();
        let mut rng = StageRng::new(params.seed, StageSlot::Boosting);

        let mut current = vec![init; n];
        let mut stages = Vec::with_capacity(params.n_stages);
        for _ in 0..params.n_stages {
            let residuals: Vec<f64> = y.iter().zip(&current).map(|(t, p)| t - p).collect();
            let tree = RegressionTree::fit(x, &residuals, &rows, &tree_params, &mut rng);
            for (pred, row) in current.iter_mut().zip(x) {
                *pred += params.learning_rate * tree.predict(row);
            }
            stages.push(tree);
        }

        Self {
            init,
            learning_rate: params.learning_rate,
            stages,
            n_features,
            schema_fingerprint,
        }
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Estimator for GradientBoostingRegressor {
    fn kind(&self) -> &'static str { "roi" }

    fn feature_count(&self) -> usize { self.n_features }

    fn schema_fingerprint(&self) -> u64 { self.schema_fingerprint }
}

impl PointEstimator for GradientBoostingRegressor {
    fn predict(&self, row: &[f64]) -> f64 {
        self.init
            + self
                .stages
                .iter()
                .map(|t| self.learning_rate * t.predict(row))
                .sum::<f64>()
    }
}
