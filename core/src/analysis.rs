//! Historical campaign analysis.

use crate::{
    error::{PipelineError, PipelineResult},
    types::CampaignRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAnalysis {
    pub success_rate:          f64,
    pub avg_roi:               f64,
    /// Campaign type with the highest mean success.
    pub best_performing_type:  String,
    /// Offer type with the highest mean ROI.
    pub best_performing_offer: String,
}

/// Ties resolve to the lexicographically first name.
pub fn analyze_campaigns(history: &[CampaignRecord]) -> PipelineResult<CampaignAnalysis> {
    if history.is_empty() {
        return Err(PipelineError::fit("cannot analyse an empty campaign history"));
    }
    let n = history.len() as f64;
    let success_rate = history.iter().filter(|c| c.success).count() as f64 / n;
    let avg_roi = history.iter().map(|c| c.roi).sum::<f64>() / n;

    let best_performing_type = best_group_mean(history, |c| &c.campaign_type, |c| {
        if c.success { 1.0 } else { 0.0 }
    });
    let best_performing_offer = best_group_mean(history, |c| &c.offer_type, |c| c.roi);

    Ok(CampaignAnalysis {
        success_rate,
        avg_roi,
        best_performing_type,
        best_performing_offer,
    })
}

fn best_group_mean(
    history: &[CampaignRecord],
    key: impl Fn(&CampaignRecord) -> &String,
    value: impl Fn(&CampaignRecord) -> f64,
) -> String {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for c in history {
        let entry = groups.entry(key(c).as_str()).or_insert((0.0, 0));
        entry.0 += value(c);
        entry.1 += 1;
    }
    let mut best: Option<(&str, f64)> = None;
    for (name, (sum, count)) in groups {
        let mean = sum / count as f64;
        if best.map_or(true, |(_, m)| mean > m) {
            best = Some((name, mean));
        }
    }
    best.map(|(name, _)| name.to_string()).unwrap_or_default()
}
