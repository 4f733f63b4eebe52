use super::PipelineStore;
use crate::{
    encoder::Schema,
    error::{PipelineError, PipelineResult},
    estimator::{Estimator, TrainedModel},
    types::RunId,
};
use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

/// Metadata of one stored artifact, without its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSummary {
    pub run_id:        RunId,
    pub kind:          String,
    pub feature_count: usize,
    pub fingerprint:   String,
    pub created_at:    String,
}

impl PipelineStore {
    // ── Model artifacts ────────────────────────────────────────

    /// Persist a (model, schema) unit under (run_id, kind). Both halves go
    /// into the same row in a single statement; saving again for the same
    /// run and kind replaces the pair.
    pub fn save_model<M>(&self, run_id: &str, model: &TrainedModel<M>) -> PipelineResult<()>
    where
        M: Estimator + Serialize,
    {
        let schema_json = serde_json::to_string(model.schema())?;
        let model_json = serde_json::to_string(model.estimator())?;
        let kind = model.estimator().kind();

        self.conn.execute(
            "INSERT INTO model_artifact (
                run_id, kind, schema_json, model_json, feature_count, fingerprint, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(run_id, kind) DO UPDATE SET
                schema_json   = excluded.schema_json,
                model_json    = excluded.model_json,
                feature_count = excluded.feature_count,
                fingerprint   = excluded.fingerprint,
                created_at    = excluded.created_at",
            params![
                run_id,
                kind,
                schema_json,
                model_json,
                model.schema().len() as i64,
                format!("{:016x}", model.schema().fingerprint()),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        log::debug!("saved {kind} artifact for run {run_id} ({} features)", model.schema().len());
        Ok(())
    }

    /// Load the (model, schema) unit of `kind` saved by `run_id`. The pair
    /// is re-verified on the way out, and `M` must be the estimator that
    /// saves under `kind`.
    pub fn load_model<M>(&self, run_id: &str, kind: &str) -> PipelineResult<TrainedModel<M>>
    where
        M: Estimator + DeserializeOwned,
    {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT schema_json, model_json FROM model_artifact
                 WHERE run_id = ?1 AND kind = ?2",
                params![run_id, kind],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (schema_json, model_json) = row.ok_or_else(|| PipelineError::ArtifactNotFound {
            run_id: run_id.to_string(),
            kind:   kind.to_string(),
        })?;

        let schema: Schema = serde_json::from_str(&schema_json)?;
        let estimator: M = serde_json::from_str(&model_json).map_err(|e| {
            PipelineError::ModelSchemaMismatch {
                model:    "artifact",
                expected: format!("{kind} model payload"),
                actual:   format!("undecodable payload ({e})"),
            }
        })?;
        if estimator.kind() != kind {
            return Err(PipelineError::ModelSchemaMismatch {
                model:    estimator.kind(),
                expected: format!("kind {kind}"),
                actual:   format!("kind {}", estimator.kind()),
            });
        }
        TrainedModel::new(estimator, schema)
    }

    /// Most recent run that saved an artifact of `kind`.
    pub fn latest_run_with(&self, kind: &str) -> PipelineResult<Option<RunId>> {
        let run_id = self
            .conn
            .query_row(
                "SELECT run_id FROM model_artifact
                 WHERE kind = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                params![kind],
                |row| row.get(0),
            )
            .optional()?;
        Ok(run_id)
    }

    pub fn artifacts_for_run(&self, run_id: &str) -> PipelineResult<Vec<ArtifactSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, kind, feature_count, fingerprint, created_at
             FROM model_artifact WHERE run_id = ?1
             ORDER BY kind ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(ArtifactSummary {
                    run_id:        row.get(0)?,
                    kind:          row.get(1)?,
                    feature_count: row.get::<_, i64>(2)? as usize,
                    fingerprint:   row.get(3)?,
                    created_at:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
