use campaign_core::config::{MissingStrategy, OutlierMethod, PipelineConfig, TrainingConfig};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn temp_data_dir(contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("campaign-config-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("pipeline.json"), contents).unwrap();
    dir
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[test]
fn shipped_config_matches_defaults() {
    let loaded = PipelineConfig::load("../data").unwrap();
    let defaults = PipelineConfig::default();
    assert_eq!(loaded.forecast, defaults.forecast);
    assert_eq!(loaded.training.forest_trees, defaults.training.forest_trees);
    assert_eq!(loaded.simulation.variant_a, defaults.simulation.variant_a);
    assert_eq!(loaded.simulation.variant_b, defaults.simulation.variant_b);
    assert_eq!(loaded.models_dir, "models");
    assert_eq!(loaded.preparation.missing_strategy, defaults.preparation.missing_strategy);
    assert_eq!(loaded.preparation.outlier_method, defaults.preparation.outlier_method);
    assert_eq!(loaded.preparation.contamination, defaults.preparation.contamination);
    assert_eq!(loaded.preparation.seed, defaults.preparation.seed);
}

#[test]
fn preparation_methods_parse_by_name() {
    let dir = temp_data_dir(r#"{ "preparation": { "missing_strategy": "drop", "outlier_method": "iqr" } }"#);
    let config = PipelineConfig::load(dir.to_str().unwrap()).unwrap();
    assert_eq!(config.preparation.missing_strategy, MissingStrategy::Drop);
    assert_eq!(config.preparation.outlier_method, OutlierMethod::Iqr);
    assert_eq!(config.preparation.isolation_trees, 100);
    let _ = std::fs::remove_dir_all(dir);
}

/// Sections and fields left out of the file take their defaults.
#[test]
fn partial_config_fills_defaults() {
    let dir = temp_data_dir(r#"{ "training": { "seed": 7 }, "forecast": { "min_roi": 2.0 } }"#);
    let config = PipelineConfig::load(dir.to_str().unwrap()).unwrap();
    assert_eq!(config.training.seed, 7);
    assert_eq!(config.training.test_fraction, TrainingConfig::default().test_fraction);
    assert_eq!(config.forecast.min_roi, 2.0);
    assert_eq!(config.forecast.min_success_probability, 0.6);
    assert_eq!(config.segmentation.n_clusters, 5);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn invalid_values_are_rejected() {
    let dir = temp_data_dir(r#"{ "training": { "test_fraction": 1.5 } }"#);
    assert!(PipelineConfig::load(dir.to_str().unwrap()).is_err());
    let _ = std::fs::remove_dir_all(dir);

    let mut config = PipelineConfig::default();
    config.segmentation.n_clusters = 0;
    assert!(config.validate().is_err());

    let mut config = PipelineConfig::default();
    config.preparation.contamination = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn missing_file_is_an_error() {
    assert!(PipelineConfig::load("/nonexistent/campaign-data").is_err());
}

#[test]
fn test_config_is_valid() {
    PipelineConfig::default_test().validate().unwrap();
}
