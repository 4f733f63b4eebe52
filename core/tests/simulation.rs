use campaign_core::{
    config::SimulationConfig,
    encoder::Schema,
    error::PipelineError,
    estimator::{Estimator, ProbabilityEstimator},
    simulation::{ab_test, compare_variants, simulate, CampaignEconomics, SimulationResult, Variant},
    stats::chi2_contingency_2x2,
    types::{CampaignConfig, CustomerRecord},
};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Returns a fixed probability for one campaign type and another for the rest.
struct ByType {
    email_probability: f64,
    other_probability: f64,
    email_column:      usize,
    width:             usize,
    fingerprint:       u64,
}

impl Estimator for ByType {
    fn kind(&self) -> &'static str { "by_type" }
    fn feature_count(&self) -> usize { self.width }
    fn schema_fingerprint(&self) -> u64 { self.fingerprint }
}

impl ProbabilityEstimator for ByType {
    fn predict_proba(&self, row: &[f64]) -> f64 {
        if row[self.email_column] == 1.0 { self.email_probability } else { self.other_probability }
    }
}

fn schema() -> Schema {
    Schema::new(vec![
        "campaign_type_Email".into(),
        "campaign_type_Social".into(),
        "budget".into(),
    ])
}

fn model(email: f64, other: f64) -> ByType {
    let s = schema();
    ByType {
        email_probability: email,
        other_probability: other,
        email_column:      0,
        width:             s.len(),
        fingerprint:       s.fingerprint(),
    }
}

fn customer(i: usize, segment: u32, spent: f64, frequency: f64) -> CustomerRecord {
    CustomerRecord {
        customer_id:        format!("C{i:04}"),
        age:                35.0,
        income:             40_000.0,
        total_spent:        spent,
        purchase_frequency: frequency,
        last_purchase_days: 30.0,
        name:               None,
        email:              None,
        phone:              None,
        segment:            Some(segment),
    }
}

/// 50 customers in segment 1 (AOV 300 / 3 = 100) and 10 in segment 2.
fn population() -> Vec<CustomerRecord> {
    (0..50)
        .map(|i| customer(i, 1, 300.0, 3.0))
        .chain((50..60).map(|i| customer(i, 2, 100.0, 1.0)))
        .collect()
}

fn variants() -> (CampaignConfig, CampaignConfig) {
    let config = SimulationConfig::default();
    (config.variant_a, config.variant_b)
}

fn result_with_rate(rate: f64, n: usize) -> SimulationResult {
    SimulationResult {
        conversion_rate:               rate,
        revenue:                       0.0,
        roi:                           0.0,
        predicted_success_probability: rate,
        population_size:               n,
        conversions:                   (rate * n as f64).round() as usize,
        avg_order_value:               0.0,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

/// revenue = rate × n × AOV; roi = (revenue − budget) / budget.
#[test]
fn economics_formula() {
    let e = CampaignEconomics::compute(0.1, 200, 150.0, 1000.0).unwrap();
    assert!((e.revenue - 3000.0).abs() < 1e-9);
    assert!((e.roi - 2.0).abs() < 1e-9);
}

#[test]
fn non_positive_budget_is_an_invalid_campaign() {
    let err = CampaignEconomics::compute(0.1, 200, 150.0, 0.0).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidCampaign { .. }), "got {err:?}");
}

/// Probability 1 converts everyone in the segment; only that segment counts.
#[test]
fn simulation_uses_only_the_requested_segment() {
    let (a, _) = variants();
    let result = simulate(&a, 1, &population(), &model(1.0, 0.0), &schema(), 42).unwrap();
    assert_eq!(result.population_size, 50);
    assert_eq!(result.conversions, 50);
    assert_eq!(result.conversion_rate, 1.0);
    assert!((result.avg_order_value - 100.0).abs() < 1e-9);
    // 50 × 100 = 5000 revenue on a 5000 budget.
    assert!((result.revenue - 5000.0).abs() < 1e-9);
    assert!(result.roi.abs() < 1e-9);
}

#[test]
fn empty_segment_is_an_invalid_segment() {
    let (a, _) = variants();
    let err = simulate(&a, 9, &population(), &model(0.5, 0.5), &schema(), 42).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSegment { segment: 9, .. }), "got {err:?}");
}

#[test]
fn zero_purchase_frequency_is_an_invalid_segment() {
    let (a, _) = variants();
    let population: Vec<_> = (0..5).map(|i| customer(i, 3, 100.0, 0.0)).collect();
    let err = simulate(&a, 3, &population, &model(0.5, 0.5), &schema(), 42).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSegment { segment: 3, .. }), "got {err:?}");
}

#[test]
fn schema_mismatch_is_refused() {
    let (a, _) = variants();
    let other = Schema::new(vec!["x".into(), "y".into(), "z".into()]);
    let err = simulate(&a, 1, &population(), &model(0.5, 0.5), &other, 42).unwrap_err();
    assert!(matches!(err, PipelineError::ModelSchemaMismatch { .. }), "got {err:?}");
}

#[test]
fn same_seed_same_simulation() {
    let (a, _) = variants();
    let first = simulate(&a, 1, &population(), &model(0.4, 0.4), &schema(), 7).unwrap();
    let second = simulate(&a, 1, &population(), &model(0.4, 0.4), &schema(), 7).unwrap();
    assert_eq!(first, second);
}

/// 5/100 vs 4/100: A has the higher rate but the difference is noise.
#[test]
fn small_difference_picks_a_but_is_not_significant() {
    let result = compare_variants(result_with_rate(0.05, 100), result_with_rate(0.04, 100), 100, 0.95);
    assert_eq!(result.winner, Variant::A);
    assert!(!result.significant);
    assert!(result.p_value > 0.05);
}

#[test]
fn equal_rates_go_to_b() {
    let result = compare_variants(result_with_rate(0.2, 100), result_with_rate(0.2, 100), 100, 0.95);
    assert_eq!(result.winner, Variant::B);
    assert!(!result.significant);
}

/// Email converts everyone, Social nobody: decisive and significant.
#[test]
fn ab_test_detects_a_decisive_difference() {
    let (a, b) = variants();
    let result = ab_test(&a, &b, 1, &population(), &model(1.0, 0.0), &schema(), 0.95, 42).unwrap();
    assert_eq!(result.variant_a.conversions, 50);
    assert_eq!(result.variant_b.conversions, 0);
    assert_eq!(result.winner, Variant::A);
    assert!(result.significant);
    assert!(result.p_value < 1e-6);

    let expected = chi2_contingency_2x2([[50.0, 0.0], [0.0, 50.0]]);
    assert!((result.chi_squared - expected.statistic).abs() < 1e-9);
}

/// With identical probabilities both variants see the same draws.
#[test]
fn ab_variants_share_the_bernoulli_stream() {
    let (a, b) = variants();
    let result = ab_test(&a, &b, 1, &population(), &model(0.3, 0.3), &schema(), 0.95, 11).unwrap();
    assert_eq!(result.variant_a.conversions, result.variant_b.conversions);
    assert_eq!(result.winner, Variant::B);
    assert!(!result.significant);
}
