use crate::types::{CampaignConfig, SegmentId};
use serde::{Deserialize, Serialize};

// ── Training ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub seed:                   u64,
    pub test_fraction:          f64,
    pub forest_trees:           usize,
    pub forest_max_depth:       Option<usize>,
    pub boosting_stages:        usize,
    pub boosting_learning_rate: f64,
    pub boosting_max_depth:     usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed:                   42,
            test_fraction:          0.2,
            forest_trees:           100,
            forest_max_depth:       None,
            boosting_stages:        150,
            boosting_learning_rate: 0.1,
            boosting_max_depth:     3,
        }
    }
}

// ── Forecast policy ────────────────────────────────────────────────

/// Decision boundary of the composite verdict. These are fixed business
/// policy values, not learned; the defaults are the reference rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastPolicy {
    /// Success probability must be strictly above this.
    pub min_success_probability: f64,
    /// Predicted ROI must be strictly above this.
    pub min_roi:                 f64,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            min_success_probability: 0.6,
            min_roi:                 1.0,
        }
    }
}

// ── Simulation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed:       u64,
    pub confidence: f64,
    pub segment_id: SegmentId,
    pub variant_a:  CampaignConfig,
    pub variant_b:  CampaignConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed:       42,
            confidence: 0.95,
            segment_id: 1,
            variant_a: CampaignConfig {
                campaign_type:  "Email".into(),
                offer_type:     "Gift".into(),
                target_segment: "All".into(),
                discount:       15.0,
                budget:         5000.0,
            },
            variant_b: CampaignConfig {
                campaign_type:  "Social".into(),
                offer_type:     "Bundle".into(),
                target_segment: "Frequent".into(),
                discount:       20.0,
                budget:         6000.0,
            },
        }
    }
}

// ── Segmentation ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub n_clusters:     usize,
    pub max_iterations: usize,
    pub tolerance:      f64,
    pub seed:           u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            n_clusters:     5,
            max_iterations: 300,
            tolerance:      1e-4,
            seed:           42,
        }
    }
}

// ── Data generation and preparation ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed:      u64,
    pub customers: usize,
    pub campaigns: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed:      42,
            customers: 1000,
            campaigns: 200,
        }
    }
}

/// How customers with a missing numeric attribute are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Fill with the column median.
    Median,
    /// Fill with the column mean.
    Mean,
    /// Drop the customer.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    IsolationForest,
    Iqr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparationConfig {
    pub missing_strategy: MissingStrategy,
    pub outlier_method:   OutlierMethod,
    /// Customer attributes screened for outliers.
    pub outlier_columns:  Vec<String>,
    pub iqr_factor:       f64,
    /// Expected share of outliers; the isolation forest drops this
    /// fraction of the highest-scoring customers.
    pub contamination:    f64,
    pub isolation_trees:  usize,
    /// Rows drawn per isolation tree, capped at the number of customers.
    pub isolation_sample: usize,
    pub seed:             u64,
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            missing_strategy: MissingStrategy::Median,
            outlier_method:   OutlierMethod::IsolationForest,
            outlier_columns:  vec!["income".into(), "total_spent".into()],
            iqr_factor:       1.5,
            contamination:    0.05,
            isolation_trees:  100,
            isolation_sample: 256,
            seed:             42,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub training:     TrainingConfig,
    pub forecast:     ForecastPolicy,
    pub simulation:   SimulationConfig,
    pub segmentation: SegmentationConfig,
    pub generator:    GeneratorConfig,
    pub preparation:  PreparationConfig,
    /// Directory holding the artifact database.
    pub models_dir:   String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            training:     TrainingConfig::default(),
            forecast:     ForecastPolicy::default(),
            simulation:   SimulationConfig::default(),
            segmentation: SegmentationConfig::default(),
            generator:    GeneratorConfig::default(),
            preparation:  PreparationConfig::default(),
            models_dir:   "models".into(),
        }
    }
}

impl PipelineConfig {
    /// Load from `{data_dir}/pipeline.json`. Missing sections and fields
    /// take their defaults.
    /// In tests, use PipelineConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/pipeline.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no stage can run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let t = &self.training;
        if !(0.0..1.0).contains(&t.test_fraction) {
            anyhow::bail!("training.test_fraction must be in [0, 1), got {}", t.test_fraction);
        }
        if t.forest_trees == 0 || t.boosting_stages == 0 {
            anyhow::bail!("training needs at least one tree and one boosting stage");
        }
        if !(0.0..1.0).contains(&self.simulation.confidence) {
            anyhow::bail!("simulation.confidence must be in [0, 1), got {}", self.simulation.confidence);
        }
        if self.segmentation.n_clusters == 0 {
            anyhow::bail!("segmentation.n_clusters must be > 0");
        }
        let p = &self.preparation;
        if !(p.contamination > 0.0 && p.contamination <= 0.5) {
            anyhow::bail!("preparation.contamination must be in (0, 0.5], got {}", p.contamination);
        }
        if p.isolation_trees == 0 || p.isolation_sample < 2 {
            anyhow::bail!("preparation needs at least one isolation tree and a sample of 2");
        }
        Ok(())
    }

    /// Config with smaller ensembles and datasets for use in tests.
    pub fn default_test() -> Self {
        Self {
            training: TrainingConfig {
                forest_trees:    25,
                boosting_stages: 40,
                ..TrainingConfig::default()
            },
            generator: GeneratorConfig {
                seed:      42,
                customers: 300,
                campaigns: 120,
            },
            ..Self::default()
        }
    }
}
