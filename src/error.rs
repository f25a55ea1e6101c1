use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No historical data: {0}")]
    NoHistoricalData(String),

    #[error("No valid engagement scores in historical posts")]
    NoValidTargets,

    #[error("Model not trained: no artifact at {}", .0.display())]
    ModelNotTrained(PathBuf),

    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Empty vocabulary: documents contain only stop words or no tokens")]
    EmptyVocabulary,

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl EngineError {
    pub(crate) fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        EngineError::Persistence(format!("{}: {}", context, err))
    }
}
