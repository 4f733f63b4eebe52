//! Deterministic synthetic customers and campaign history.
//!
//! Same seed = same datasets. Customers and campaigns draw from separate
//! stage streams, so changing one generator never shifts the other.

use crate::{
    rng::{StageRng, StageSlot},
    types::{CampaignRecord, CustomerRecord},
};

pub const CAMPAIGN_TYPES: [&str; 5] = ["Email", "Social", "Push", "SMS", "Direct Mail"];
const CAMPAIGN_TYPE_WEIGHTS: [f64; 5] = [0.4, 0.3, 0.15, 0.1, 0.05];
pub const TARGET_SEGMENTS: [&str; 4] = ["All", "Young", "HighIncome", "Frequent"];
pub const OFFER_TYPES: [&str; 5] = ["Discount", "Bundle", "Free Shipping", "Cashback", "Gift"];

const EMAIL_DOMAINS: [&str; 4] = ["example.com", "mail.test", "inbox.test", "post.test"];

/// Share of customers replaced by heavy-spending outliers.
const OUTLIER_SHARE: f64 = 0.05;

pub fn generate_customers(n: usize, seed: u64) -> Vec<CustomerRecord> {
    let mut rng = StageRng::new(seed, StageSlot::Customers);
    let mut customers: Vec<CustomerRecord> = (0..n)
        .map(|i| {
            let domain = EMAIL_DOMAINS[rng.next_index(EMAIL_DOMAINS.len())];
            CustomerRecord {
                customer_id:        format!("C{i:04}"),
                age:                rng.range_u64(18, 70) as f64,
                income:             rng.log_normal(10.0, 0.4).floor(),
                total_spent:        rng.exponential(500.0).floor(),
                purchase_frequency: rng.poisson(3.0) as f64,
                last_purchase_days: rng.range_u64(1, 365) as f64,
                name:               None,
                email:              Some(format!("customer{i}@{domain}")),
                phone:              Some(format!("555-{:03}-{:04}", rng.range_u64(0, 1000), rng.range_u64(0, 10_000))),
                segment:            None,
            }
        })
        .collect();

    for i in rng.sample_indices(n, (n as f64 * OUTLIER_SHARE) as usize) {
        customers[i].total_spent = rng.range_u64(10_000, 50_000) as f64;
        customers[i].purchase_frequency = rng.range_u64(50, 100) as f64;
    }
    customers
}

pub fn generate_campaign_history(n: usize, seed: u64) -> Vec<CampaignRecord> {
    let mut rng = StageRng::new(seed, StageSlot::Campaigns);
    (0..n)
        .map(|i| {
            let campaign_type = CAMPAIGN_TYPES[rng.pick_weighted(&CAMPAIGN_TYPE_WEIGHTS)];
            let target_segment = TARGET_SEGMENTS[rng.next_index(TARGET_SEGMENTS.len())];
            let offer_type = OFFER_TYPES[rng.next_index(OFFER_TYPES.len())];
            let discount_pct = round_to(rng.uniform(5.0, 50.0), 1);
            let duration_days = rng.range_u64(3, 30) as u32;
            let budget = round_to(rng.uniform(500.0, 20_000.0), 2);
            let target_size = rng.range_u64(100, 10_000);
            let conversion_rate = round_to(rng.beta(2.0, 50.0), 4);
            let roi = round_to(rng.uniform(0.5, 5.0), 2);
            let success = rng.chance(0.6);
            let avg_order_value = rng.normal(150.0, 50.0);
            let revenue = round_to(conversion_rate * target_size as f64 * avg_order_value, 2);

            CampaignRecord {
                campaign_id: format!("CAM{i:03}"),
                campaign_type: campaign_type.into(),
                offer_type: offer_type.into(),
                target_segment: target_segment.into(),
                discount_pct,
                duration_days,
                budget,
                target_size,
                conversion_rate,
                roi,
                success,
                revenue,
            }
        })
        .collect()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
