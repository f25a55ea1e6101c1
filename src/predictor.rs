use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::features::FeatureRow;
use crate::model::{load_artifact, ModelArtifact};
use crate::CandidatePost;

#[derive(Debug, Clone)]
pub struct Predictor {
    artifact_path: PathBuf,
}

impl Predictor {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn predict(&self, candidate: &CandidatePost) -> Result<f64> {
        let artifact = load_artifact(&self.artifact_path)?;
        score(&artifact, candidate)
    }
}

pub fn predict(artifact_path: &Path, candidate: &CandidatePost) -> Result<f64> {
    Predictor::new(artifact_path).predict(candidate)
}

fn score(artifact: &ModelArtifact, candidate: &CandidatePost) -> Result<f64> {
    artifact.check_schema()?;
    let row = FeatureRow::from_candidate(candidate);
    let predicted = artifact.pipeline.predict(&row)?;
    debug!(
        topic = %candidate.topic,
        predicted,
        "Scored candidate post"
    );
    Ok(predicted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArtifactStamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug)]
pub struct CachedPredictor {
    artifact_path: PathBuf,
    cached: Option<(ArtifactStamp, ModelArtifact)>,
}

impl CachedPredictor {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            cached: None,
        }
    }

    pub fn predict(&mut self, candidate: &CandidatePost) -> Result<f64> {
        let artifact = self.current()?;
        score(artifact, candidate)
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    fn current(&mut self) -> Result<&ModelArtifact> {
        let stamp = match std::fs::metadata(&self.artifact_path) {
            Ok(meta) => ArtifactStamp {
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.cached = None;
                return Err(EngineError::ModelNotTrained(self.artifact_path.clone()));
            }
            Err(err) => return Err(EngineError::persistence("failed to stat model", err)),
        };

        let fresh = matches!(&self.cached, Some((cached, _)) if *cached == stamp && stamp.modified.is_some());
        if !fresh {
            debug!(path = %self.artifact_path.display(), "Reloading model artifact");
            let artifact = load_artifact(&self.artifact_path)?;
            self.cached = Some((stamp, artifact));
        }

        match &self.cached {
            Some((_, artifact)) => Ok(artifact),
            None => Err(EngineError::ModelNotTrained(self.artifact_path.clone())),
        }
    }
}
