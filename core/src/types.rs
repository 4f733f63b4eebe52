//! Shared record types used across the entire pipeline.

use serde::{Deserialize, Serialize};

/// The canonical run identifier.
pub type RunId = String;

/// An integer cluster label assigned to customers.
pub type SegmentId = u32;

/// One historical campaign. Immutable once generated or loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub campaign_id:     String,
    pub campaign_type:   String,
    pub offer_type:      String,
    pub target_segment:  String,
    pub discount_pct:    f64,
    #[serde(default)]
    pub duration_days:   u32,
    pub budget:          f64,
    pub target_size:     u64,
    pub conversion_rate: f64,
    pub roi:             f64,
    pub success:         bool,
    pub revenue:         f64,
}

impl CampaignRecord {
    /// The predictor attributes of this campaign, outcomes stripped.
    pub fn candidate(&self) -> CandidateCampaign {
        CandidateCampaign {
            campaign_type:  self.campaign_type.clone(),
            offer_type:     self.offer_type.clone(),
            target_segment: self.target_segment.clone(),
            discount_pct:   self.discount_pct,
            budget:         self.budget,
            target_size:    self.target_size,
        }
    }
}

/// A campaign whose outcome is still to be predicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCampaign {
    pub campaign_type:  String,
    pub offer_type:     String,
    pub target_segment: String,
    pub discount_pct:   f64,
    pub budget:         f64,
    pub target_size:    u64,
}

/// A campaign variant as configured for simulation. The audience size is
/// not part of the configuration; it comes from the simulated segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    #[serde(rename = "type")]
    pub campaign_type:  String,
    pub offer_type:     String,
    pub target_segment: String,
    pub discount:       f64,
    pub budget:         f64,
}

impl CampaignConfig {
    pub fn candidate(&self, target_size: u64) -> CandidateCampaign {
        CandidateCampaign {
            campaign_type:  self.campaign_type.clone(),
            offer_type:     self.offer_type.clone(),
            target_segment: self.target_segment.clone(),
            discount_pct:   self.discount,
            budget:         self.budget,
            target_size,
        }
    }
}

/// One customer. `segment` is filled in by segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id:        String,
    pub age:                f64,
    pub income:             f64,
    pub total_spent:        f64,
    pub purchase_frequency: f64,
    pub last_purchase_days: f64,
    #[serde(default)]
    pub name:               Option<String>,
    #[serde(default)]
    pub email:              Option<String>,
    #[serde(default)]
    pub phone:              Option<String>,
    #[serde(default)]
    pub segment:            Option<SegmentId>,
}

/// A customer as read from an input file. Any attribute may be absent or
/// null; `preparation::handle_missing_data` turns these into
/// `CustomerRecord`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCustomerRecord {
    pub customer_id:        String,
    pub age:                Option<f64>,
    pub income:             Option<f64>,
    pub total_spent:        Option<f64>,
    pub purchase_frequency: Option<f64>,
    pub last_purchase_days: Option<f64>,
    pub name:               Option<String>,
    pub email:              Option<String>,
    pub phone:              Option<String>,
}

impl RawCustomerRecord {
    /// The numeric attributes, in `CustomerRecord::clustering_features` order.
    pub fn numeric_features(&self) -> [Option<f64>; 5] {
        [
            self.age,
            self.income,
            self.total_spent,
            self.purchase_frequency,
            self.last_purchase_days,
        ]
    }
}

impl From<&CustomerRecord> for RawCustomerRecord {
    fn from(c: &CustomerRecord) -> Self {
        Self {
            customer_id:        c.customer_id.clone(),
            age:                Some(c.age),
            income:             Some(c.income),
            total_spent:        Some(c.total_spent),
            purchase_frequency: Some(c.purchase_frequency),
            last_purchase_days: Some(c.last_purchase_days),
            name:               c.name.clone(),
            email:              c.email.clone(),
            phone:              c.phone.clone(),
        }
    }
}

impl CustomerRecord {
    /// The numeric attributes used for clustering, in fixed order.
    pub fn clustering_features(&self) -> [f64; 5] {
        [
            self.age,
            self.income,
            self.total_spent,
            self.purchase_frequency,
            self.last_purchase_days,
        ]
    }
}
