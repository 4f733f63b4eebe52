//! Campaign analytics core: schema-aligned encoding, response and ROI
//! models, forecasting, segment simulation and A/B testing.

pub mod analysis;
pub mod boosting;
pub mod config;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod event;
pub mod forecast;
pub mod forest;
pub mod generator;
pub mod isolation;
pub mod metrics;
pub mod pipeline;
pub mod preparation;
pub mod report;
pub mod response_model;
pub mod rng;
pub mod roi_model;
pub mod segmentation;
pub mod simulation;
pub mod stats;
pub mod store;
pub mod training;
pub mod tree;
pub mod types;
