//! campaign-runner: headless pipeline runner.
//!
//! Usage:
//!   campaign-runner --seed 42
//!   campaign-runner --customers customers.json --campaigns campaigns.json
//!   campaign-runner --data-dir ./data --db models/artifacts.db --report reports/report.json

use anyhow::{Context, Result};
use campaign_core::{
    config::PipelineConfig,
    generator::{generate_campaign_history, generate_customers},
    pipeline::CampaignPipeline,
    report::CampaignReport,
    store::PipelineStore,
    types::{CampaignRecord, RawCustomerRecord},
};
use serde::de::DeserializeOwned;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    let mut config = match PipelineConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{e}; using default configuration");
            PipelineConfig::default()
        }
    };
    if let Some(seed) = string_arg(&args, "--seed").and_then(|s| s.parse::<u64>().ok()) {
        config.training.seed = seed;
        config.simulation.seed = seed;
        config.segmentation.seed = seed;
        config.generator.seed = seed;
        config.preparation.seed = seed;
    }
    let seed = config.training.seed;

    let default_db = format!("{}/artifacts.db", config.models_dir);
    let db = string_arg(&args, "--db").unwrap_or(&default_db).to_string();
    let report_path = string_arg(&args, "--report")
        .unwrap_or("reports/campaign_report.json")
        .to_string();

    let (customers, campaigns) = match (
        string_arg(&args, "--customers"),
        string_arg(&args, "--campaigns"),
    ) {
        (Some(c), Some(h)) => {
            println!("Loading datasets from {c} and {h}");
            (read_json::<Vec<RawCustomerRecord>>(c)?, read_json::<Vec<CampaignRecord>>(h)?)
        }
        _ => {
            println!("Generating sample datasets");
            let generated = generate_customers(config.generator.customers, config.generator.seed);
            (
                generated.iter().map(RawCustomerRecord::from).collect(),
                generate_campaign_history(config.generator.campaigns, config.generator.seed),
            )
        }
    };

    println!("Campaign pipeline: campaign-runner");
    println!("  seed:       {seed}");
    println!("  db:         {db}");
    println!("  data_dir:   {data_dir}");
    println!("  customers:  {}", customers.len());
    println!("  campaigns:  {}", campaigns.len());
    println!();

    if db != ":memory:" {
        if let Some(parent) = std::path::Path::new(&db).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
    }
    let store = PipelineStore::open(&db)?;
    store.migrate()?;

    let run_id = CampaignPipeline::new_run_id();
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let pipeline = CampaignPipeline::new(run_id, config, store);
    let report = pipeline.run_raw(&customers, &campaigns)?;

    write_report(&report, &report_path)?;
    print_summary(&report, &report_path);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Cannot parse {path}"))
}

fn write_report(report: &CampaignReport, path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, report.to_json_pretty()?).with_context(|| format!("Cannot write {path}"))
}

fn print_summary(report: &CampaignReport, report_path: &str) {
    let c = &report.predicted_campaign;
    let ab = &report.ab_test;
    let f = &report.forecast;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:            {}", report.run_id);
    println!("  segments:          {}", report.segments.len());
    println!("  success rate:      {:.2}", report.conversion_rate);
    println!("  avg order value:   {:.2}", report.avg_order_value);
    println!("  response accuracy: {:.3}", report.response_report.accuracy);
    println!("  roi r2 / mae:      {:.3} / {:.3}", report.roi_metrics.r_squared, report.roi_metrics.mean_absolute_error);
    println!("  privacy:           {}", if report.privacy_compliance.handled { "Met" } else { "Needs attention" });

    println!();
    println!("=== A/B TEST ===");
    println!("  A conversion:      {:.3} (roi {:.2})", ab.variant_a.conversion_rate, ab.variant_a.roi);
    println!("  B conversion:      {:.3} (roi {:.2})", ab.variant_b.conversion_rate, ab.variant_b.roi);
    println!("  p-value:           {:.4}{}", ab.p_value, if ab.significant { " (significant)" } else { "" });
    println!("  winner:            {:?}", ab.winner);

    println!();
    println!("=== PREDICTED CAMPAIGN ===");
    println!("  type:              {}", c.campaign_type);
    println!("  offer:             {}", c.offer_type);
    println!("  target:            {}", c.target_segment);
    println!("  discount:          {}%", c.discount_pct);
    println!("  budget:            ${:.2}", c.budget);
    println!("  target size:       {}", c.target_size);
    println!("  success prob:      {:.2}", f.success_probability);
    println!("  predicted roi:     {:.2}", f.predicted_roi);
    println!("  verdict:           {}", if f.predicted_success { "success" } else { "not recommended" });

    println!();
    println!("Report saved to {report_path} at {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"));
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
