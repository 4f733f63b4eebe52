//! CART regression tree, the building block of both estimators.
//!
//! Splits minimise the summed squared error of the two children. On a 0/1
//! target the squared error of a node is n·p·(1−p), i.e. half its Gini
//! impurity, so the same tree serves the classifier: leaf values are then the
//! positive-class fraction.

use crate::rng::StageRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    /// Number of features drawn per split. `None` considers all of them.
    pub max_features:      Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature:   usize,
    threshold: f64,
    error:     f64,
}

impl RegressionTree {
    /// Fit on the rows of `x` listed in `rows` (duplicates allowed, which is
    /// how bootstrap samples are expressed). `rows` must be non-empty.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        rows: &[usize],
        params: &TreeParams,
        rng: &mut StageRng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let n_features = x.first().map_or(0, |r| r.len());
        tree.grow(x, y, rows.to_vec(), 0, n_features, params, rng);
        tree
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    #[allow(clippy::too_many_arguments)]
    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        rows: Vec<usize>,
        depth: usize,
        n_features: usize,
        params: &TreeParams,
        rng: &mut StageRng,
    ) -> usize {
        let idx = self.nodes.len();
        let (sum, sum_sq) = rows.iter().fold((0.0, 0.0), |(s, q), &r| (s + y[r], q + y[r] * y[r]));
        let n = rows.len() as f64;
        let mean = sum / n;
        self.nodes.push(Node::Leaf { value: mean });

        let node_error = sum_sq - sum * sum / n;
        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || rows.len() < params.min_samples_split || node_error <= 1e-12 {
            return idx;
        }

        let features = candidate_features(n_features, params.max_features, rng);
        let Some(split) = best_split(x, y, &rows, &features, params.min_samples_leaf) else {
            return idx;
        };
        if split.error >= node_error - 1e-12 {
            return idx;
        }

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| x[r][split.feature] <= split.threshold);

        let left = self.grow(x, y, left_rows, depth + 1, n_features, params, rng);
        let right = self.grow(x, y, right_rows, depth + 1, n_features, params, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }
}

fn candidate_features(n_features: usize, max_features: Option<usize>, rng: &mut StageRng) -> Vec<usize> {
    match max_features {
        Some(m) if m < n_features => rng.sample_indices(n_features, m),
        _ => (0..n_features).collect(),
    }
}

fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    features: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let n = rows.len();
    let min_leaf = min_leaf.max(1);
    if n < 2 * min_leaf {
        return None;
    }
    let total: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();

    let mut best: Option<SplitCandidate> = None;
    let mut sorted = rows.to_vec();
    for &f in features {
        sorted.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 1..n {
            let prev = sorted[i - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];
            if i < min_leaf || n - i < min_leaf {
                continue;
            }
            let lo = x[prev][f];
            let hi = x[sorted[i]][f];
            if lo == hi {
                continue;
            }
            let nl = i as f64;
            let nr = (n - i) as f64;
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let error = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
            if best.as_ref().map_or(true, |b| error < b.error) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate { feature: f, threshold, error });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StageSlot;

    #[test]
    fn learns_a_step_function() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();
        let rows: Vec<usize> = (0..20).collect();
        let mut rng = StageRng::new(1, StageSlot::Boosting);

        let tree = RegressionTree::fit(&x, &y, &rows, &TreeParams::default(), &mut rng);

        assert_eq!(tree.predict(&[3.0]), 1.0);
        assert_eq!(tree.predict(&[15.0]), 5.0);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn respects_max_depth() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();
        let rows: Vec<usize> = (0..64).collect();
        let params = TreeParams { max_depth: Some(3), ..TreeParams::default() };
        let mut rng = StageRng::new(1, StageSlot::Boosting);

        let tree = RegressionTree::fit(&x, &y, &rows, &params, &mut rng);

        assert!(tree.depth() <= 3);
        assert!(tree.node_count() <= 15);
    }

    #[test]
    fn constant_target_is_a_single_leaf() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![2.5; 10];
        let rows: Vec<usize> = (0..10).collect();
        let mut rng = StageRng::new(1, StageSlot::Boosting);

        let tree = RegressionTree::fit(&x, &y, &rows, &TreeParams::default(), &mut rng);

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[100.0, 0.0]), 2.5);
    }
}
