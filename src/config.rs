use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub artifact_path: PathBuf,
    pub n_estimators: usize,
    pub random_seed: u64,
    pub max_text_features: usize,
    pub holdout_min_rows: usize,
    pub test_fraction: f64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("models/post_engagement_model.json"),
            n_estimators: 100,
            random_seed: 42,
            max_text_features: 1000,
            holdout_min_rows: 10,
            test_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub max_topic_suggestions: usize,
    pub phrase_top_n: usize,
    pub phrase_max_features: usize,
    pub min_docs_per_cohort: usize,
    pub min_prompt_rows: usize,
    pub low_quantile: f64,
    pub high_quantile: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            max_topic_suggestions: 3,
            phrase_top_n: 5,
            phrase_max_features: 100,
            min_docs_per_cohort: 2,
            min_prompt_rows: 4,
            low_quantile: 0.25,
            high_quantile: 0.75,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub insights: InsightConfig,
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| EngineError::Config(format!("failed to read config: {}", err)))?;
                toml::from_str(&contents)
                    .map_err(|err| EngineError::Config(format!("failed to parse config: {}", err)))?
            }
            _ => EngineConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    EngineError::Config(format!("failed to create config dir: {}", err))
                })?;
            }
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| EngineError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| EngineError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("ENGAGEMENT_ARTIFACT_PATH") {
            if !path.trim().is_empty() {
                self.model.artifact_path = PathBuf::from(path);
            }
        }
        if let Ok(seed) = env::var("ENGAGEMENT_RANDOM_SEED") {
            if let Ok(value) = seed.parse::<u64>() {
                self.model.random_seed = value;
            }
        }
        if let Ok(trees) = env::var("ENGAGEMENT_N_ESTIMATORS") {
            if let Ok(value) = trees.parse::<usize>() {
                if value > 0 {
                    self.model.n_estimators = value;
                }
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ENGAGEMENT_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/engine.toml")))
}
