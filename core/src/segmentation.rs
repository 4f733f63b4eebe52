//! Customer segmentation: z-score scaling + k-means.
//!
//! Initial centroids come from seeded k-means++; Lloyd iterations run until
//! the total squared centroid shift drops below the tolerance or the
//! iteration budget is spent. A cluster that loses all its members keeps
//! its previous centroid.

use crate::{
    config::SegmentationConfig,
    encoder::Schema,
    error::{PipelineError, PipelineResult},
    estimator::{Estimator, TrainedModel},
    rng::{StageRng, StageSlot},
    types::{CustomerRecord, SegmentId},
};
use serde::{Deserialize, Serialize};

pub const CLUSTERING_FEATURES: [&str; 5] =
    ["age", "income", "total_spent", "purchase_frequency", "last_purchase_days"];

pub fn clustering_schema() -> Schema {
    Schema::new(CLUSTERING_FEATURES.iter().map(|s| s.to_string()).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means:  Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Population mean and standard deviation per column. A constant column
    /// gets scale 1 so it maps to 0 rather than NaN.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let n = rows.len().max(1) as f64;
        let width = rows.first().map_or(0, |r| r.len());
        let means: Vec<f64> = (0..width)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();
        let scales = (0..width)
            .map(|j| {
                let var = rows.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
                if var > 0.0 { var.sqrt() } else { 1.0 }
            })
            .collect();
        Self { means, scales }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationModel {
    scaler:             StandardScaler,
    centroids:          Vec<Vec<f64>>,
    pub inertia:        f64,
    pub iterations:     usize,
    schema_fingerprint: u64,
}

impl SegmentationModel {
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Nearest centroid for an (unscaled) customer.
    pub fn assign(&self, customer: &CustomerRecord) -> SegmentId {
        let point = self.scaler.transform(&customer.clustering_features());
        nearest(&point, &self.centroids).0 as SegmentId
    }
}

impl Estimator for SegmentationModel {
    fn kind(&self) -> &'static str { "segmentation" }

    fn feature_count(&self) -> usize { CLUSTERING_FEATURES.len() }

    fn schema_fingerprint(&self) -> u64 { self.schema_fingerprint }
}

/// Per-segment size and attribute means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInsight {
    pub segment:                 SegmentId,
    pub size:                    usize,
    pub mean_age:                f64,
    pub mean_income:             f64,
    pub mean_total_spent:        f64,
    pub mean_purchase_frequency: f64,
    pub mean_last_purchase_days: f64,
}

/// Cluster `customers` and return copies labelled with their segment.
pub fn segment_customers(
    customers: &[CustomerRecord],
    config: &SegmentationConfig,
) -> PipelineResult<(Vec<CustomerRecord>, TrainedModel<SegmentationModel>)> {
    let k = config.n_clusters;
    if k == 0 || customers.len() < k {
        return Err(PipelineError::fit(format!(
            "{} customers cannot form {k} segments",
            customers.len()
        )));
    }

    let raw: Vec<Vec<f64>> = customers.iter().map(|c| c.clustering_features().to_vec()).collect();
    let scaler = StandardScaler::fit(&raw);
    let points: Vec<Vec<f64>> = raw.iter().map(|r| scaler.transform(r)).collect();

    let mut rng = StageRng::new(config.seed, StageSlot::Clustering);
    let mut centroids = kmeans_plus_plus(&points, k, &mut rng);
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..config.max_iterations.max(1) {
        iterations += 1;
        for (label, point) in labels.iter_mut().zip(&points) {
            *label = nearest(point, &centroids).0;
        }
        let updated = recompute_centroids(&points, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum();
        centroids = updated;
        if shift <= config.tolerance {
            break;
        }
    }

    // Final assignment against the converged centroids.
    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(&points) {
        let (idx, dist) = nearest(point, &centroids);
        *label = idx;
        inertia += dist;
    }

    let segmented = customers
        .iter()
        .zip(&labels)
        .map(|(c, &label)| CustomerRecord { segment: Some(label as SegmentId), ..c.clone() })
        .collect();

    log::info!(
        "segmented {} customers into {k} clusters in {iterations} iterations (inertia {inertia:.1})",
        customers.len()
    );

    let schema = clustering_schema();
    let model = SegmentationModel {
        scaler,
        centroids,
        inertia,
        iterations,
        schema_fingerprint: schema.fingerprint(),
    };
    Ok((segmented, TrainedModel::new(model, schema)?))
}

/// Size and attribute means for every segment present, ordered by label.
/// Unlabelled customers are skipped.
pub fn segment_insights(customers: &[CustomerRecord]) -> Vec<SegmentInsight> {
    let mut groups: std::collections::BTreeMap<SegmentId, Vec<&CustomerRecord>> = Default::default();
    for c in customers {
        if let Some(s) = c.segment {
            groups.entry(s).or_default().push(c);
        }
    }
    groups
        .into_iter()
        .map(|(segment, members)| {
            let n = members.len() as f64;
            let mean = |f: fn(&CustomerRecord) -> f64| members.iter().map(|c| f(*c)).sum::<f64>() / n;
            SegmentInsight {
                segment,
                size: members.len(),
                mean_age: mean(|c| c.age),
                mean_income: mean(|c| c.income),
                mean_total_spent: mean(|c| c.total_spent),
                mean_purchase_frequency: mean(|c| c.purchase_frequency),
                mean_last_purchase_days: mean(|c| c.last_purchase_days),
            }
        })
        .collect()
}

fn kmeans_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StageRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![points[rng.next_index(points.len())].clone()];
    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let next = if weights.iter().sum::<f64>() > 0.0 {
            rng.pick_weighted(&weights)
        } else {
            rng.next_index(points.len())
        };
        centroids.push(points[next].clone());
    }
    centroids
}

fn recompute_centroids(points: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let width = previous.first().map_or(0, |c| c.len());
    let mut sums = vec![vec![0.0; width]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (s, v) in sums[label].iter_mut().zip(point) {
            *s += v;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), old)| {
            if count == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// Index of and squared distance to the closest centroid.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
