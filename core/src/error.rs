use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot fit model: {reason}")]
    Fit { reason: String },

    #[error("Invalid segment {segment}: {reason}")]
    InvalidSegment { segment: u32, reason: String },

    #[error("Invalid campaign: {reason}")]
    InvalidCampaign { reason: String },

    #[error("Model '{model}' does not match schema: expected {expected}, got {actual}")]
    ModelSchemaMismatch {
        model:    &'static str,
        expected: String,
        actual:   String,
    },

    #[error("No '{kind}' artifact stored for run '{run_id}'")]
    ArtifactNotFound { run_id: String, kind: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn fit(reason: impl Into<String>) -> Self {
        Self::Fit { reason: reason.into() }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
