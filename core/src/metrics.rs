//! Evaluation metrics for the held-out partition.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1_score:  f64,
    pub support:   usize,
}

/// Per-class precision/recall/F1 plus aggregates. Divisions by zero
/// report 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    #[serde(rename = "0")]
    pub failure:      ClassMetrics,
    #[serde(rename = "1")]
    pub success:      ClassMetrics,
    pub accuracy:     f64,
    pub macro_avg:    ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_predictions(actual: &[bool], predicted: &[bool]) -> Self {
        let failure = class_metrics(actual, predicted, false);
        let success = class_metrics(actual, predicted, true);
        let total = actual.len();
        let correct = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();

        let macro_avg = ClassMetrics {
            precision: (failure.precision + success.precision) / 2.0,
            recall:    (failure.recall + success.recall) / 2.0,
            f1_score:  (failure.f1_score + success.f1_score) / 2.0,
            support:   total,
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            ratio(
                f(&failure) * failure.support as f64 + f(&success) * success.support as f64,
                total as f64,
            )
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall:    weight(|m| m.recall),
            f1_score:  weight(|m| m.f1_score),
            support:   total,
        };

        Self {
            failure,
            success,
            accuracy: ratio(correct as f64, total as f64),
            macro_avg,
            weighted_avg,
        }
    }
}

fn class_metrics(actual: &[bool], predicted: &[bool], class: bool) -> ClassMetrics {
    let pairs = || actual.iter().zip(predicted);
    let tp = pairs().filter(|(a, p)| **a == class && **p == class).count() as f64;
    let predicted_pos = pairs().filter(|(_, p)| **p == class).count() as f64;
    let support = actual.iter().filter(|a| **a == class).count();

    let precision = ratio(tp, predicted_pos);
    let recall = ratio(tp, support as f64);
    let f1_score = ratio(2.0 * precision * recall, precision + recall);
    ClassMetrics { precision, recall, f1_score, support }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub r_squared:           f64,
    pub mean_absolute_error: f64,
}

impl RegressionMetrics {
    /// R² falls back to 1.0 (perfect) or 0.0 when the actual values have
    /// no variance.
    pub fn from_predictions(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len() as f64;
        if actual.is_empty() {
            return Self { r_squared: 0.0, mean_absolute_error: 0.0 };
        }
        let mean = actual.iter().sum::<f64>() / n;
        let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        let mae = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum::<f64>() / n;

        let r_squared = if ss_tot == 0.0 {
            if ss_res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - ss_res / ss_tot
        };
        Self { r_squared, mean_absolute_error: mae }
    }
}
