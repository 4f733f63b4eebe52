//! Customer data preparation: missing values, anonymisation and outlier
//! removal.

use crate::{
    config::{MissingStrategy, OutlierMethod, PreparationConfig},
    isolation::{IsolationForest, IsolationParams},
    rng::{StageRng, StageSlot},
    types::{CustomerRecord, RawCustomerRecord},
};
use std::collections::BTreeMap;

/// Resolve absent attributes of input customers.
///
/// Numeric gaps are filled with the column median or mean, or the customer
/// is dropped, per `strategy`. Statistics come from the values present in
/// the input. A column with no values at all cannot be filled, so customers
/// missing it are dropped under every strategy. Missing names, emails and
/// phones take the most frequent value of their column.
pub fn handle_missing_data(raw: &[RawCustomerRecord], strategy: MissingStrategy) -> Vec<CustomerRecord> {
    let fills: Vec<Option<f64>> = (0..5)
        .map(|col| {
            let mut present: Vec<f64> = raw.iter().filter_map(|c| c.numeric_features()[col]).collect();
            if present.is_empty() {
                return None;
            }
            match strategy {
                MissingStrategy::Median => {
                    present.sort_by(f64::total_cmp);
                    Some(quantile(&present, 0.5))
                }
                MissingStrategy::Mean => Some(present.iter().sum::<f64>() / present.len() as f64),
                MissingStrategy::Drop => None,
            }
        })
        .collect();
    let name_mode = mode(raw.iter().map(|c| c.name.as_deref()));
    let email_mode = mode(raw.iter().map(|c| c.email.as_deref()));
    let phone_mode = mode(raw.iter().map(|c| c.phone.as_deref()));

    let mut dropped = 0usize;
    let kept: Vec<CustomerRecord> = raw
        .iter()
        .filter_map(|c| {
            let values = c.numeric_features();
            let mut filled = [0.0; 5];
            for (col, value) in values.into_iter().enumerate() {
                match value.or(fills[col]) {
                    Some(v) => filled[col] = v,
                    None => {
                        dropped += 1;
                        return None;
                    }
                }
            }
            let [age, income, total_spent, purchase_frequency, last_purchase_days] = filled;
            Some(CustomerRecord {
                customer_id: c.customer_id.clone(),
                age,
                income,
                total_spent,
                purchase_frequency,
                last_purchase_days,
                name:    c.name.clone().or_else(|| name_mode.clone()),
                email:   c.email.clone().or_else(|| email_mode.clone()),
                phone:   c.phone.clone().or_else(|| phone_mode.clone()),
                segment: None,
            })
        })
        .collect();
    if dropped > 0 {
        log::warn!("dropped {dropped} of {} customers with missing attributes", raw.len());
    }
    kept
}

/// Most frequent present value; ties go to the smallest.
fn mode<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values.flatten() {
        *counts.entry(v).or_default() += 1;
    }
    let best = counts.values().copied().max()?;
    counts.into_iter().find(|&(_, n)| n == best).map(|(v, _)| v.to_string())
}

/// Replace identifying details with stable placeholders.
///   name  → Customer_{index}
///   email → user_{index}@{original domain}
///   phone → XXX-XXX-{last four characters}
pub fn anonymize_customers(customers: &[CustomerRecord]) -> Vec<CustomerRecord> {
    customers
        .iter()
        .enumerate()
        .map(|(i, c)| CustomerRecord {
            name: c.name.as_ref().map(|_| format!("Customer_{i}")),
            email: c.email.as_deref().map(|email| {
                let domain = email.split_once('@').map_or("", |(_, d)| d);
                format!("user_{i}@{domain}")
            }),
            phone: c.phone.as_deref().map(|phone| {
                let chars: Vec<char> = phone.chars().collect();
                let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
                format!("XXX-XXX-{tail}")
            }),
            ..c.clone()
        })
        .collect()
}

/// Screen outliers with the configured method.
pub fn remove_outliers(customers: &[CustomerRecord], config: &PreparationConfig) -> Vec<CustomerRecord> {
    match config.outlier_method {
        OutlierMethod::IsolationForest => remove_outliers_isolation(customers, config),
        OutlierMethod::Iqr => remove_outliers_iqr(customers, config),
    }
}

/// Fit a seeded isolation forest on the configured columns and drop the
/// `contamination` share of customers with the highest anomaly scores.
pub fn remove_outliers_isolation(customers: &[CustomerRecord], config: &PreparationConfig) -> Vec<CustomerRecord> {
    let accessors: Vec<fn(&CustomerRecord) -> f64> = config
        .outlier_columns
        .iter()
        .filter_map(|column| {
            let get = column_accessor(column);
            if get.is_none() {
                log::warn!("outlier screening skipped unknown column '{column}'");
            }
            get
        })
        .collect();
    if accessors.is_empty() {
        return customers.to_vec();
    }

    let points: Vec<Vec<f64>> = customers
        .iter()
        .map(|c| accessors.iter().map(|get| get(c)).collect())
        .collect();
    let params = IsolationParams {
        n_trees:     config.isolation_trees,
        sample_size: config.isolation_sample,
    };
    let mut rng = StageRng::new(config.seed, StageSlot::Outliers);
    let Some(forest) = IsolationForest::fit(&points, &params, &mut rng) else {
        return customers.to_vec();
    };

    let scores: Vec<f64> = points.iter().map(|p| forest.score(p)).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(f64::total_cmp);
    let threshold = quantile(&sorted, 1.0 - config.contamination);

    let kept: Vec<CustomerRecord> = customers
        .iter()
        .zip(&scores)
        .filter(|&(_, &score)| score <= threshold)
        .map(|(c, _)| c.clone())
        .collect();
    log::info!(
        "isolation forest ({} trees) kept {} of {} customers",
        forest.n_trees(),
        kept.len(),
        customers.len()
    );
    kept
}

/// Drop customers outside [Q1 − k·IQR, Q3 + k·IQR] for any configured
/// column. Bounds for every column come from the full input; unknown column
/// names are skipped with a warning.
pub fn remove_outliers_iqr(customers: &[CustomerRecord], config: &PreparationConfig) -> Vec<CustomerRecord> {
    let mut bounds = Vec::new();
    for column in &config.outlier_columns {
        let Some(get) = column_accessor(column) else {
            log::warn!("outlier screening skipped unknown column '{column}'");
            continue;
        };
        let mut values: Vec<f64> = customers.iter().map(get).collect();
        values.sort_by(f64::total_cmp);
        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        bounds.push((get, q1 - config.iqr_factor * iqr, q3 + config.iqr_factor * iqr));
    }

    let kept: Vec<CustomerRecord> = customers
        .iter()
        .filter(|&c| bounds.iter().all(|(get, lo, hi)| (*lo..=*hi).contains(&get(c))))
        .cloned()
        .collect();
    log::info!("outlier screening kept {} of {} customers", kept.len(), customers.len());
    kept
}

fn column_accessor(name: &str) -> Option<fn(&CustomerRecord) -> f64> {
    let get: fn(&CustomerRecord) -> f64 = match name {
        "age"                => |c| c.age,
        "income"             => |c| c.income,
        "total_spent"        => |c| c.total_spent,
        "purchase_frequency" => |c| c.purchase_frequency,
        "last_purchase_days" => |c| c.last_purchase_days,
        _ => return None,
    };
    Some(get)
}

/// Linear-interpolated quantile of sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
