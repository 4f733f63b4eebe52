use campaign_core::{
    config::PipelineConfig,
    encoder::{encode_for_schema, RawRecord, Schema},
    error::PipelineError,
    estimator::{PointEstimator, ProbabilityEstimator, TrainedModel},
    generator::generate_campaign_history,
    response_model::{train_response_model, ResponseModel},
    roi_model::{train_roi_model, RoiModel},
    store::PipelineStore,
    types::CampaignRecord,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn make_store(run_ids: &[&str]) -> PipelineStore {
    let store = PipelineStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    for run_id in run_ids {
        store.insert_run(run_id, 42, "0.1.0-test").expect("insert run");
    }
    store
}

fn history() -> Vec<CampaignRecord> {
    generate_campaign_history(100, 42)
}

fn trained() -> (ResponseModel, RoiModel) {
    let config = PipelineConfig::default_test();
    let (response, _, _) = train_response_model(&history(), &config.training).unwrap();
    let (roi, _, _) = train_roi_model(&history(), &config.training).unwrap();
    (response, roi)
}

// ── Tests ───────────────────────────────────────────────────────────────────

/// A loaded unit predicts what the saved one did.
#[test]
fn saved_models_predict_identically_after_loading() {
    let store = make_store(&["artifact-run"]);
    let (response, roi) = trained();
    store.save_model("artifact-run", &response).unwrap();
    store.save_model("artifact-run", &roi).unwrap();

    let loaded_response: ResponseModel = store.load_model("artifact-run", "response").unwrap();
    let loaded_roi: RoiModel = store.load_model("artifact-run", "roi").unwrap();
    assert_eq!(loaded_response.schema(), response.schema());
    assert_eq!(loaded_roi.schema(), roi.schema());

    for campaign in history().iter().take(20) {
        let record = RawRecord::from(&campaign.candidate());
        let row = encode_for_schema(&record, response.schema());
        let p = response.estimator().predict_proba(&row);
        assert!((loaded_response.estimator().predict_proba(&row) - p).abs() < 1e-9);
        let row = encode_for_schema(&record, roi.schema());
        let r = roi.estimator().predict(&row);
        assert!((loaded_roi.estimator().predict(&row) - r).abs() < 1e-9);
    }
}

#[test]
fn missing_artifact_is_reported() {
    let store = make_store(&["empty-run"]);
    let err = store.load_model::<campaign_core::forest::RandomForestClassifier>("empty-run", "response")
        .unwrap_err();
    assert!(
        matches!(&err, PipelineError::ArtifactNotFound { run_id, kind } if run_id == "empty-run" && kind == "response"),
        "got {err:?}"
    );
}

/// Saving again for the same run and kind replaces the pair.
#[test]
fn saving_twice_replaces_the_pair() {
    let store = make_store(&["replace-run"]);
    let (response, _) = trained();
    store.save_model("replace-run", &response).unwrap();
    store.save_model("replace-run", &response).unwrap();

    let summaries = store.artifacts_for_run("replace-run").unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].kind, "response");
    assert_eq!(summaries[0].feature_count, response.schema().len());
    assert_eq!(summaries[0].fingerprint, format!("{:016x}", response.schema().fingerprint()));
}

/// A trained estimator only pairs with its own schema, in its own order.
#[test]
fn reordered_schema_is_refused() {
    let store = make_store(&["tamper-run"]);
    let (response, _) = trained();
    let (forest, schema) = response.into_parts();

    let mut features = schema.features().to_vec();
    features.reverse();
    let reordered = Schema::new(features);
    assert!(matches!(
        TrainedModel::new(forest.clone(), reordered),
        Err(PipelineError::ModelSchemaMismatch { .. })
    ));

    let response = TrainedModel::new(forest, schema).unwrap();
    store.save_model("tamper-run", &response).unwrap();
    assert!(store.load_model::<campaign_core::forest::RandomForestClassifier>("tamper-run", "response").is_ok());
}

#[test]
fn runs_are_isolated_and_latest_is_found() {
    let store = make_store(&["run-a", "run-b"]);
    let (response, roi) = trained();
    store.save_model("run-a", &response).unwrap();
    store.save_model("run-a", &roi).unwrap();
    store.save_model("run-b", &response).unwrap();

    assert_eq!(store.artifacts_for_run("run-a").unwrap().len(), 2);
    assert_eq!(store.artifacts_for_run("run-b").unwrap().len(), 1);
    assert_eq!(store.latest_run_with("response").unwrap().as_deref(), Some("run-b"));
    assert_eq!(store.latest_run_with("roi").unwrap().as_deref(), Some("run-a"));
    assert_eq!(store.latest_run_with("segmentation").unwrap(), None);

    let err = store.load_model::<campaign_core::boosting::GradientBoostingRegressor>("run-b", "roi")
        .unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactNotFound { .. }));
}

/// Asking for a stored kind with the wrong estimator type is a pairing
/// error, not a decoding error.
#[test]
fn loading_a_kind_as_the_wrong_estimator_is_refused() {
    let store = make_store(&["mixed-run"]);
    let (response, roi) = trained();
    store.save_model("mixed-run", &response).unwrap();
    store.save_model("mixed-run", &roi).unwrap();

    let err = store.load_model::<campaign_core::forest::RandomForestClassifier>("mixed-run", "roi")
        .unwrap_err();
    assert!(matches!(err, PipelineError::ModelSchemaMismatch { .. }), "got {err:?}");

    let err = store.load_model::<campaign_core::boosting::GradientBoostingRegressor>("mixed-run", "response")
        .unwrap_err();
    assert!(matches!(err, PipelineError::ModelSchemaMismatch { .. }), "got {err:?}");

    let err = store.load_model::<campaign_core::segmentation::SegmentationModel>("mixed-run", "response")
        .unwrap_err();
    assert!(matches!(err, PipelineError::ModelSchemaMismatch { .. }), "got {err:?}");
}

/// A file-backed store keeps artifacts across connections.
#[test]
fn artifacts_survive_reopening_the_database() {
    let path = std::env::temp_dir().join(format!("campaign-artifacts-{}.db", uuid::Uuid::new_v4()));
    let path = path.to_string_lossy().to_string();

    let store = PipelineStore::open(&path).unwrap();
    store.migrate().unwrap();
    store.insert_run("file-run", 7, "0.1.0-test").unwrap();
    let (response, _) = trained();
    store.save_model("file-run", &response).unwrap();

    let reopened = store.reopen().unwrap();
    assert_eq!(reopened.run_seed("file-run").unwrap(), 7);
    let loaded: ResponseModel = reopened.load_model("file-run", "response").unwrap();
    assert_eq!(loaded.schema(), response.schema());

    drop(store);
    drop(reopened);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}
