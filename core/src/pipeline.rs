//! The pipeline runner: one end-to-end analytics run.
//!
//! STAGE ORDER (fixed, documented, never reordered):
//!   1. Prepare customers   (fill gaps, anonymise, drop outliers)
//!   2. Segment customers   (scaler + k-means)
//!   3. Analyse campaigns
//!   4. Train response model, persist (model, schema)
//!   5. Train ROI model, persist (model, schema)
//!   6. A/B test the configured variants on the configured segment
//!   7. Forecast the recommended campaign
//!
//! RULES:
//!   - Every stage records a PipelineEvent in the event log.
//!   - Artifacts are written under this run's id only.
//!   - All randomness flows from the seeds in PipelineConfig.

use crate::{
    analysis::analyze_campaigns,
    config::PipelineConfig,
    error::PipelineResult,
    event::{EventLogEntry, PipelineEvent},
    forecast::{forecast_with_models, ForecastResult},
    preparation::{anonymize_customers, handle_missing_data, remove_outliers},
    report::{historical_avg_order_value, CampaignReport, PrivacyCompliance},
    response_model::{train_response_model, ResponseModel},
    roi_model::{train_roi_model, RoiModel},
    segmentation::{segment_customers, segment_insights},
    simulation::ab_test,
    store::PipelineStore,
    types::{CampaignRecord, CandidateCampaign, CustomerRecord, RawCustomerRecord, RunId},
};

/// Target segment, discount, budget and audience size of the recommended
/// campaign; type and offer come from the analysis.
const RECOMMENDED_TARGET_SEGMENT: &str = "HighIncome";
const RECOMMENDED_DISCOUNT_PCT: f64 = 20.0;
const RECOMMENDED_BUDGET: f64 = 10_000.0;
const RECOMMENDED_TARGET_SIZE: u64 = 5_000;

pub struct CampaignPipeline {
    pub run_id: RunId,
    pub config: PipelineConfig,
    pub store:  PipelineStore,
}

impl CampaignPipeline {
    pub fn new(run_id: RunId, config: PipelineConfig, store: PipelineStore) -> Self {
        Self { run_id, config, store }
    }

    /// Fresh, globally unique run id.
    pub fn new_run_id() -> RunId {
        format!("run-{}", uuid::Uuid::new_v4())
    }

    /// In-memory store, migrated, with the run registered, and the
    /// small test configuration.
    pub fn build_test(run_id: RunId) -> PipelineResult<Self> {
        let config = PipelineConfig::default_test();
        let store = PipelineStore::in_memory()?;
        store.migrate()?;
        store.insert_run(&run_id, config.training.seed, "0.1.0-test")?;
        Ok(Self::new(run_id, config, store))
    }

    /// Resolve missing attributes with the configured strategy, then run.
    pub fn run_raw(
        &self,
        customers: &[RawCustomerRecord],
        campaigns: &[CampaignRecord],
    ) -> PipelineResult<CampaignReport> {
        let complete = handle_missing_data(customers, self.config.preparation.missing_strategy);
        log::info!("{} of {} input customers usable", complete.len(), customers.len());
        self.run(&complete, campaigns)
    }

    /// Execute every stage in order and assemble the report.
    pub fn run(
        &self,
        customers: &[CustomerRecord],
        campaigns: &[CampaignRecord],
    ) -> PipelineResult<CampaignReport> {
        self.emit("run", PipelineEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed:   self.config.training.seed,
        })?;

        // 1. Prepare
        let anonymized = anonymize_customers(customers);
        let prepared = remove_outliers(&anonymized, &self.config.preparation);
        self.emit("preparation", PipelineEvent::CustomersPrepared {
            received: customers.len(),
            kept:     prepared.len(),
        })?;

        // 2. Segment
        let (segmented, segmentation) = segment_customers(&prepared, &self.config.segmentation)?;
        self.store.save_model(&self.run_id, &segmentation)?;
        self.emit("segmentation", PipelineEvent::CustomersSegmented {
            customers: segmented.len(),
            clusters:  segmentation.estimator().n_clusters(),
            inertia:   segmentation.estimator().inertia,
        })?;

        // 3. Analyse
        let analysis = analyze_campaigns(campaigns)?;
        self.emit("analysis", PipelineEvent::CampaignsAnalyzed {
            campaigns:    campaigns.len(),
            success_rate: analysis.success_rate,
            avg_roi:      analysis.avg_roi,
        })?;

        // 4–5. Train and persist
        let (response, response_report, response_schema) =
            train_response_model(campaigns, &self.config.training)?;
        self.emit("training", PipelineEvent::ModelTrained {
            kind:     "response".into(),
            features: response_schema.len(),
            schema:   format!("{:016x}", response_schema.fingerprint()),
            score:    response_report.accuracy,
        })?;
        self.store.save_model(&self.run_id, &response)?;
        self.emit("training", PipelineEvent::ArtifactSaved { kind: "response".into() })?;

        let (roi, roi_metrics, roi_schema) = train_roi_model(campaigns, &self.config.training)?;
        self.emit("training", PipelineEvent::ModelTrained {
            kind:     "roi".into(),
            features: roi_schema.len(),
            schema:   format!("{:016x}", roi_schema.fingerprint()),
            score:    roi_metrics.r_squared,
        })?;
        self.store.save_model(&self.run_id, &roi)?;
        self.emit("training", PipelineEvent::ArtifactSaved { kind: "roi".into() })?;

        // 6. A/B test
        let sim = &self.config.simulation;
        let ab = ab_test(
            &sim.variant_a,
            &sim.variant_b,
            sim.segment_id,
            &segmented,
            response.estimator(),
            response.schema(),
            sim.confidence,
            sim.seed,
        )?;
        self.emit("simulation", PipelineEvent::AbTestCompleted {
            segment:     sim.segment_id,
            winner:      ab.winner,
            p_value:     ab.p_value,
            significant: ab.significant,
        })?;

        // 7. Forecast
        let candidate = CandidateCampaign {
            campaign_type:  analysis.best_performing_type.clone(),
            offer_type:     analysis.best_performing_offer.clone(),
            target_segment: RECOMMENDED_TARGET_SEGMENT.into(),
            discount_pct:   RECOMMENDED_DISCOUNT_PCT,
            budget:         RECOMMENDED_BUDGET,
            target_size:    RECOMMENDED_TARGET_SIZE,
        };
        let forecast = forecast_with_models(&candidate, &response, &roi, &self.config.forecast)?;
        self.record_forecast(&forecast)?;

        Ok(CampaignReport {
            run_id:             self.run_id.clone(),
            generated_at:       chrono::Utc::now().to_rfc3339(),
            privacy_compliance: PrivacyCompliance { handled: true },
            conversion_rate:    analysis.success_rate,
            avg_order_value:    historical_avg_order_value(campaigns),
            segments:           segment_insights(&segmented),
            analysis,
            response_report,
            roi_metrics,
            ab_test:            ab,
            predicted_campaign: candidate,
            forecast,
        })
    }

    /// Load the response and ROI units saved by `run_id`.
    pub fn load_models(&self, run_id: &str) -> PipelineResult<(ResponseModel, RoiModel)> {
        let response = self.store.load_model(run_id, "response")?;
        let roi = self.store.load_model(run_id, "roi")?;
        Ok((response, roi))
    }

    /// Forecast `candidate` with the models persisted by `run_id`.
    pub fn forecast_from_store(
        &self,
        run_id: &str,
        candidate: &CandidateCampaign,
    ) -> PipelineResult<ForecastResult> {
        let (response, roi) = self.load_models(run_id)?;
        let result = forecast_with_models(candidate, &response, &roi, &self.config.forecast)?;
        self.record_forecast(&result)?;
        Ok(result)
    }

    pub fn events(&self) -> PipelineResult<Vec<EventLogEntry>> {
        self.store.events_for_run(&self.run_id)
    }

    fn record_forecast(&self, result: &ForecastResult) -> PipelineResult<()> {
        self.emit("forecast", PipelineEvent::ForecastProduced {
            success_probability: result.success_probability,
            predicted_roi:       result.predicted_roi,
            predicted_success:   result.predicted_success,
        })
    }

    fn emit(&self, stage: &str, event: PipelineEvent) -> PipelineResult<()> {
        let entry = EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            stage:      stage.to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(&event)?,
        };
        self.store.append_event(&entry)?;
        log::debug!("{stage}: {}", entry.event_type);
        Ok(())
    }
}
