use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::features::schema_fingerprint;
use crate::model::pipeline::ModelPipeline;
use crate::model::training::HoldoutMetrics;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub schema_fingerprint: String,
    pub training_rows: usize,
    pub holdout: Option<HoldoutMetrics>,
    pub pipeline: ModelPipeline,
}

impl ModelArtifact {
    pub fn new(pipeline: ModelPipeline, training_rows: usize, holdout: Option<HoldoutMetrics>) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            schema_fingerprint: schema_fingerprint(),
            training_rows,
            holdout,
            pipeline,
        }
    }

    pub fn check_schema(&self) -> Result<()> {
        let current = schema_fingerprint();
        if self.schema_fingerprint != current {
            return Err(EngineError::FeatureMismatch(format!(
                "artifact was trained on feature layout {}, current layout is {}",
                self.schema_fingerprint, current
            )));
        }
        Ok(())
    }
}

// Each save gets its own temp file beside the destination and is renamed
// into place, so concurrent saves never share a partially written file.
pub fn save_artifact(path: &Path, artifact: &ModelArtifact) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| EngineError::persistence("failed to create model dir", err))?;

    let payload = serde_json::to_vec(artifact)
        .map_err(|err| EngineError::persistence("failed to serialize model", err))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|err| EngineError::persistence("failed to create temp model file", err))?;
    tmp.write_all(&payload)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|err| EngineError::persistence("failed to write model", err))?;
    tmp.persist(path)
        .map_err(|err| EngineError::persistence("failed to finalize model", err.error))?;
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    if !path.exists() {
        return Err(EngineError::ModelNotTrained(path.to_path_buf()));
    }
    let data = std::fs::read(path).map_err(|err| EngineError::persistence("failed to read model", err))?;
    let artifact: ModelArtifact = serde_json::from_slice(&data)
        .map_err(|err| EngineError::persistence("failed to parse model", err))?;
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(EngineError::Persistence(format!(
            "unsupported model format version {} (expected {})",
            artifact.format_version, ARTIFACT_FORMAT_VERSION
        )));
    }
    Ok(artifact)
}
