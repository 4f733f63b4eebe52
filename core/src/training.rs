//! Shared training plumbing: feature matrix construction and the seeded
//! train/test split used by both trainers.

use crate::{
    encoder::{encode_batch, RawRecord, Schema},
    error::{PipelineError, PipelineResult},
    rng::{StageRng, StageSlot},
    types::CampaignRecord,
};

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test:  Vec<usize>,
}

/// Shuffle `0..n` with the split stream of `seed`; the first
/// ceil(n × test_fraction) indices form the test partition.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n);
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StageRng::new(seed, StageSlot::Split);
    rng.shuffle(&mut indices);
    let train = indices.split_off(n_test);
    TrainTestSplit { train, test: indices }
}

/// Encoded history: the schema it induced and one row per campaign.
pub struct FeatureMatrix {
    pub schema: Schema,
    pub rows:   Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a fresh schema from `history` and encode every campaign
    /// against it.
    pub fn from_history(history: &[CampaignRecord]) -> PipelineResult<Self> {
        if history.is_empty() {
            return Err(PipelineError::fit("campaign history is empty"));
        }
        let records: Vec<RawRecord> = history
            .iter()
            .map(|c| RawRecord::from(&c.candidate()))
            .collect();
        let schema = Schema::from_records(&records);
        let rows = encode_batch(&records, &schema);
        Ok(Self { schema, rows })
    }

    pub fn select(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices.iter().map(|&i| self.rows[i].clone()).collect()
    }
}

pub(crate) fn select<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sizes_round_test_partition_up() {
        let split = train_test_split(11, 0.2, 42);
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn split_partitions_are_disjoint_and_complete() {
        let split = train_test_split(50, 0.2, 7);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible() {
        assert_eq!(train_test_split(40, 0.2, 42), train_test_split(40, 0.2, 42));
        assert_ne!(train_test_split(40, 0.2, 42), train_test_split(40, 0.2, 43));
    }
}
