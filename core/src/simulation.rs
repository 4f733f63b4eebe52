//! Campaign simulation and A/B testing against a customer segment.
//!
//! RULES:
//!   - Every `simulate` call draws from a Bernoulli stream seeded with the
//!     same explicit seed, so repeated calls (and both A/B variants) see
//!     the same uniform draws. Outcomes are reproducible, not independent.
//!   - The A/B winner is the variant with the strictly higher conversion
//!     rate (ties go to B). Significance is reported next to it and never
//!     changes it.

use crate::{
    encoder::{encode_for_schema, RawRecord, Schema},
    error::{PipelineError, PipelineResult},
    estimator::{check_pairing, ProbabilityEstimator},
    rng::{StageRng, StageSlot},
    stats::chi2_contingency_2x2,
    types::{CampaignConfig, CustomerRecord, SegmentId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub conversion_rate:               f64,
    pub revenue:                       f64,
    pub roi:                           f64,
    pub predicted_success_probability: f64,
    pub population_size:               usize,
    pub conversions:                   usize,
    pub avg_order_value:               f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestResult {
    pub variant_a:   SimulationResult,
    pub variant_b:   SimulationResult,
    pub chi_squared: f64,
    pub p_value:     f64,
    pub significant: bool,
    pub winner:      Variant,
}

/// Revenue and ROI of a campaign reaching `population_size` customers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CampaignEconomics {
    pub revenue: f64,
    pub roi:     f64,
}

impl CampaignEconomics {
    pub fn compute(
        conversion_rate: f64,
        population_size: usize,
        avg_order_value: f64,
        budget: f64,
    ) -> PipelineResult<Self> {
        if budget <= 0.0 {
            return Err(PipelineError::InvalidCampaign {
                reason: format!("budget must be positive, got {budget}"),
            });
        }
        let revenue = conversion_rate * population_size as f64 * avg_order_value;
        Ok(Self {
            revenue,
            roi: (revenue - budget) / budget,
        })
    }
}

/// Simulate `campaign` against the customers of `segment_id`.
pub fn simulate<R: ProbabilityEstimator + ?Sized>(
    campaign: &CampaignConfig,
    segment_id: SegmentId,
    population: &[CustomerRecord],
    response_model: &R,
    response_schema: &Schema,
    seed: u64,
) -> PipelineResult<SimulationResult> {
    check_pairing(response_model, response_schema)?;

    let segment: Vec<&CustomerRecord> = population
        .iter()
        .filter(|c| c.segment == Some(segment_id))
        .collect();
    if segment.is_empty() {
        return Err(PipelineError::InvalidSegment {
            segment: segment_id,
            reason:  "no customers in segment".into(),
        });
    }
    let n = segment.len();

    let mean_spent = segment.iter().map(|c| c.total_spent).sum::<f64>() / n as f64;
    let mean_frequency = segment.iter().map(|c| c.purchase_frequency).sum::<f64>() / n as f64;
    if mean_frequency <= 0.0 {
        return Err(PipelineError::InvalidSegment {
            segment: segment_id,
            reason:  "mean purchase frequency is zero".into(),
        });
    }
    let avg_order_value = mean_spent / mean_frequency;

    let record = RawRecord::from(&campaign.candidate(n as u64));
    let row = encode_for_schema(&record, response_schema);
    let probability = response_model.predict_proba(&row).clamp(0.0, 1.0);

    let mut rng = StageRng::new(seed, StageSlot::Bernoulli);
    let conversions = (0..n).filter(|_| rng.chance(probability)).count();
    let conversion_rate = conversions as f64 / n as f64;

    let economics = CampaignEconomics::compute(conversion_rate, n, avg_order_value, campaign.budget)?;

    log::debug!(
        "simulated {} / {} on segment {segment_id}: p={probability:.3}, {conversions}/{n} converted, roi {:.2}",
        campaign.campaign_type,
        campaign.offer_type,
        economics.roi,
    );

    Ok(SimulationResult {
        conversion_rate,
        revenue: economics.revenue,
        roi: economics.roi,
        predicted_success_probability: probability,
        population_size: n,
        conversions,
        avg_order_value,
    })
}

/// Simulate both variants on the same segment and test the difference.
#[allow(clippy::too_many_arguments)]
pub fn ab_test<R: ProbabilityEstimator + ?Sized>(
    campaign_a: &CampaignConfig,
    campaign_b: &CampaignConfig,
    segment_id: SegmentId,
    population: &[CustomerRecord],
    response_model: &R,
    response_schema: &Schema,
    confidence: f64,
    seed: u64,
) -> PipelineResult<AbTestResult> {
    let a = simulate(campaign_a, segment_id, population, response_model, response_schema, seed)?;
    let b = simulate(campaign_b, segment_id, population, response_model, response_schema, seed)?;
    let result = compare_variants(a, b, a.population_size, confidence);

    log::info!(
        "A/B on segment {segment_id}: A {:.3} vs B {:.3}, p={:.4}, winner {:?}{}",
        a.conversion_rate,
        b.conversion_rate,
        result.p_value,
        result.winner,
        if result.significant { " (significant)" } else { "" },
    );
    Ok(result)
}

/// Build the 2×2 table from two conversion rates over `population_size`
/// customers and run the chi-squared test.
pub fn compare_variants(
    a: SimulationResult,
    b: SimulationResult,
    population_size: usize,
    confidence: f64,
) -> AbTestResult {
    let n = population_size as f64;
    let conversions_a = (a.conversion_rate * n).round();
    let conversions_b = (b.conversion_rate * n).round();
    let test = chi2_contingency_2x2([
        [conversions_a, n - conversions_a],
        [conversions_b, n - conversions_b],
    ]);

    let winner = if a.conversion_rate > b.conversion_rate { Variant::A } else { Variant::B };

    AbTestResult {
        variant_a: a,
        variant_b: b,
        chi_squared: test.statistic,
        p_value: test.p_value,
        significant: test.p_value < 1.0 - confidence,
        winner,
    }
}
