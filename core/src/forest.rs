//! Random forest classifier: bagged CART trees on a 0/1 target.

use crate::{
    estimator::{Estimator, ProbabilityEstimator},
    rng::{StageRng, StageSlot},
    tree::{RegressionTree, TreeParams},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees:   usize,
    pub max_depth: Option<usize>,
    pub seed:      u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees:              Vec<RegressionTree>,
    n_features:         usize,
    schema_fingerprint: u64,
}

impl RandomForestClassifier {
    /// Fit on `x` against `labels`. Callers guarantee `x` is non-empty and
    /// both classes are present.
    pub fn fit(x: &[Vec<f64>], labels: &[bool], params: &ForestParams, schema_fingerprint: u64) -> Self {
        let n = x.len();
        let n_features = x.first().map_or(0, |r| r.len());
        let y: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let tree_params = TreeParams {
            max_depth:    params.max_depth,
            max_features: Some(((n_features as f64).sqrt() as usize).max(1)),
            ..TreeParams::default()
        };

        let mut rng = StageRng::new(params.seed, StageSlot::Bootstrap);
        let trees = (0..params.n_trees.max(1))
            .map(|_| {
                let rows: Vec<usize> = (0..n).map(|_| rng.next_index(n)).collect();
                RegressionTree::fit(x, &y, &rows, &tree_params, &mut rng)
            })
            .collect();

        Self { trees, n_features, schema_fingerprint }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Hard label at the 0.5 cut.
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }
}

impl Estimator for RandomForestClassifier {
    fn kind(&self) -> &'static str { "response" }

    fn feature_count(&self) -> usize { self.n_features }

    fn schema_fingerprint(&self) -> u64 { self.schema_fingerprint }
}

impl ProbabilityEstimator for RandomForestClassifier {
    fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        (total / self.trees.len() as f64).clamp(0.0, 1.0)
    }
}
