//! Schema-aligned feature encoding.
//!
//! RULE: Training and inference encode through the same routine.
//! A `Schema` is built once from training rows and never mutated. Encoding
//! against it is a projection:
//!   - schema features missing from the record are zero-filled,
//!   - record features missing from the schema are dropped,
//!   - unseen categorical values produce all-zero indicator columns.
//! Nothing in this module returns an error.

use crate::types::CandidateCampaign;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The predictor attributes of a campaign, in expansion order.
pub const CATEGORICAL_ATTRIBUTES: [&str; 3] = ["campaign_type", "offer_type", "target_segment"];
pub const NUMERIC_ATTRIBUTES: [&str; 3] = ["discount_pct", "budget", "target_size"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Numeric(f64),
    Categorical(String),
}

/// Raw attributes of one record, in attribute order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    attributes: Vec<(String, AttributeValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categorical(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .push((name.to_string(), AttributeValue::Categorical(value.into())));
        self
    }

    pub fn numeric(mut self, name: &str, value: f64) -> Self {
        self.attributes
            .push((name.to_string(), AttributeValue::Numeric(value)));
        self
    }

    pub fn attributes(&self) -> &[(String, AttributeValue)] {
        &self.attributes
    }

    /// One-hot expand categoricals into `{attribute}_{value}` = 1.0;
    /// numerics pass through under their own name.
    pub fn expand(&self) -> Vec<(String, f64)> {
        self.attributes
            .iter()
            .map(|(name, value)| match value {
                AttributeValue::Numeric(v) => (name.clone(), *v),
                AttributeValue::Categorical(v) => (format!("{name}_{v}"), 1.0),
            })
            .collect()
    }
}

impl From<&CandidateCampaign> for RawRecord {
    fn from(c: &CandidateCampaign) -> Self {
        RawRecord::new()
            .categorical("campaign_type", c.campaign_type.as_str())
            .categorical("offer_type", c.offer_type.as_str())
            .categorical("target_segment", c.target_segment.as_str())
            .numeric("discount_pct", c.discount_pct)
            .numeric("budget", c.budget)
            .numeric("target_size", c.target_size as f64)
    }
}

/// The fixed, ordered set of named numeric feature slots a model was
/// trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    features: Vec<String>,
}

impl Schema {
    pub fn new(features: Vec<String>) -> Self {
        Self { features }
    }

    /// Union of expanded keys over all rows, first-seen order.
    pub fn from_records(records: &[RawRecord]) -> Self {
        let mut seen = HashSet::new();
        let mut features = Vec::new();
        for record in records {
            for (key, _) in record.expand() {
                if seen.insert(key.clone()) {
                    features.push(key);
                }
            }
        }
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Stable FNV-1a digest of the ordered feature names. Recorded in every
    /// fitted estimator so a model can recognise its own schema.
    pub fn fingerprint(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for name in &self.features {
            for byte in name.bytes().chain(std::iter::once(0u8)) {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x0100_0000_01b3);
            }
        }
        hash
    }
}

/// Project one record onto `schema`. Always returns `schema.len()` values.
pub fn encode_for_schema(record: &RawRecord, schema: &Schema) -> Vec<f64> {
    let expanded: HashMap<String, f64> = record.expand().into_iter().collect();
    schema
        .features
        .iter()
        .map(|name| expanded.get(name).copied().unwrap_or(0.0))
        .collect()
}

/// Batch form of `encode_for_schema`; one row per record.
pub fn encode_batch(records: &[RawRecord], schema: &Schema) -> Vec<Vec<f64>> {
    records
        .iter()
        .map(|record| encode_for_schema(record, schema))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_depends_on_order() {
        let a = Schema::new(vec!["x".into(), "y".into()]);
        let b = Schema::new(vec!["y".into(), "x".into()]);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }

    #[test]
    fn separator_prevents_concatenation_collisions() {
        let a = Schema::new(vec!["ab".into(), "c".into()]);
        let b = Schema::new(vec!["a".into(), "bc".into()]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
