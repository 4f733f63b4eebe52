//! Isolation forest: anomaly scores from random partitioning.
//!
//! Each tree splits a random subsample on a random feature at a uniform
//! threshold until points are isolated or the height limit is reached.
//! Anomalies isolate in few splits, so a short mean path means a high score.
//! score(x) = 2^(−E[h(x)] / c(ψ)) with ψ the subsample size.

use crate::rng::StageRng;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Copy)]
pub struct IsolationParams {
    pub n_trees:     usize,
    /// Rows drawn per tree; capped at the number of points.
    pub sample_size: usize,
}

impl Default for IsolationParams {
    fn default() -> Self {
        Self { n_trees: 100, sample_size: 256 }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn fit(points: &[Vec<f64>], rows: Vec<usize>, height_limit: usize, rng: &mut StageRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(points, rows, 0, height_limit, rng);
        tree
    }

    fn grow(
        &mut self,
        points: &[Vec<f64>],
        rows: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StageRng,
    ) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });
        if depth >= height_limit || rows.len() <= 1 {
            return idx;
        }

        // Only features that still vary inside this node can split it.
        let width = points.first().map_or(0, |p| p.len());
        let ranges: Vec<(usize, f64, f64)> = (0..width)
            .filter_map(|f| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    (lo.min(points[r][f]), hi.max(points[r][f]))
                });
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();
        if ranges.is_empty() {
            return idx;
        }

        let (feature, lo, hi) = ranges[rng.next_index(ranges.len())];
        let threshold = rng.uniform(lo, hi);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.iter().partition(|&&r| points[r][feature] < threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return idx;
        }

        let left = self.grow(points, left_rows, depth + 1, height_limit, rng);
        let right = self.grow(points, right_rows, depth + 1, height_limit, rng);
        self.nodes[idx] = Node::Split { feature, threshold, left, right };
        idx
    }

    fn path_length(&self, point: &[f64]) -> f64 {
        let mut idx = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split { feature, threshold, left, right } => {
                    let v = point.get(*feature).copied().unwrap_or(0.0);
                    idx = if v < *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees:       Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit on `points`, one row per observation. Returns `None` when there
    /// are fewer than two points.
    pub fn fit(points: &[Vec<f64>], params: &IsolationParams, rng: &mut StageRng) -> Option<Self> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let sample_size = params.sample_size.clamp(2, n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let trees = (0..params.n_trees.max(1))
            .map(|_| {
                let rows = rng.sample_indices(n, sample_size);
                IsolationTree::fit(points, rows, height_limit, rng)
            })
            .collect();
        Some(Self { trees, sample_size })
    }

    /// Anomaly score in (0, 1]; values near 1 are outliers, values well
    /// below 0.5 are inliers.
    pub fn score(&self, point: &[f64]) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(point)).sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.sample_size))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Average path length of an unsuccessful binary-search-tree lookup among
/// `n` points: c(n) = 2·H(n−1) − 2(n−1)/n.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let m = (n - 1) as f64;
            2.0 * (m.ln() + EULER_GAMMA) - 2.0 * m / n as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StageSlot;

    #[test]
    fn path_length_normaliser_matches_known_values() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) ≈ 10.24
        assert!((average_path_length(256) - 10.244).abs() < 0.01);
    }

    #[test]
    fn isolated_point_scores_highest() {
        let mut points: Vec<Vec<f64>> = (0..100)
            .map(|i| vec![(i % 10) as f64, (i / 10) as f64])
            .collect();
        points.push(vec![500.0, 500.0]);
        let mut rng = StageRng::new(42, StageSlot::Outliers);
        let forest = IsolationForest::fit(&points, &IsolationParams::default(), &mut rng).unwrap();
        let outlier = forest.score(&points[100]);
        assert!(outlier > 0.6, "outlier score {outlier}");
        assert!(points[..100].iter().all(|p| forest.score(p) < outlier));
    }

    #[test]
    fn too_few_points_fit_nothing() {
        let mut rng = StageRng::new(1, StageSlot::Outliers);
        assert!(IsolationForest::fit(&[vec![1.0]], &IsolationParams::default(), &mut rng).is_none());
    }
}
