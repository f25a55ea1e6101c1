use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::error::Result;
use crate::features::build_training_frame;
use crate::model::artifact::{save_artifact, ModelArtifact};
use crate::model::pipeline::ModelPipeline;
use crate::HistoricalPost;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub rmse: f64,
    pub r2: f64,
    pub test_rows: usize,
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub holdout: Option<HoldoutMetrics>,
    pub artifact_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub success: bool,
    pub message: String,
    pub summary: Option<TrainingSummary>,
}

pub fn train(posts: &[HistoricalPost], config: &ModelConfig) -> TrainOutcome {
    match fit_and_save(posts, config) {
        Ok(summary) => TrainOutcome {
            success: true,
            message: "Model trained and saved successfully.".to_string(),
            summary: Some(summary),
        },
        Err(err) => {
            warn!(error = %err, "Model training failed");
            TrainOutcome {
                success: false,
                message: err.to_string(),
                summary: None,
            }
        }
    }
}

pub fn fit_and_save(posts: &[HistoricalPost], config: &ModelConfig) -> Result<TrainingSummary> {
    info!(posts = posts.len(), "Starting model training");
    let frame = build_training_frame(posts)?;
    let rows = frame.len();

    let (train_frame, test_frame) = match holdout_split(rows, config) {
        Some((train_idx, test_idx)) => {
            debug!(train = train_idx.len(), test = test_idx.len(), "Holding out rows for evaluation");
            (frame.subset(&train_idx), Some(frame.subset(&test_idx)))
        }
        None => {
            debug!(rows, "Too few rows for a holdout; training on everything");
            (frame, None)
        }
    };

    let pipeline = ModelPipeline::fit(&train_frame, config)?;
    info!(rows = train_frame.len(), trees = pipeline.regressor().n_trees(), "Model fitted");

    let holdout = match &test_frame {
        Some(test) => {
            let predicted = pipeline.predict_many(&test.rows)?;
            let metrics = HoldoutMetrics {
                rmse: rmse(&test.targets, &predicted),
                r2: r2_score(&test.targets, &predicted),
                test_rows: test.len(),
            };
            info!(rmse = metrics.rmse, r2 = metrics.r2, "Holdout evaluation");
            Some(metrics)
        }
        None => None,
    };

    let artifact = ModelArtifact::new(pipeline, train_frame.len(), holdout.clone());
    save_artifact(&config.artifact_path, &artifact)?;
    info!(path = %config.artifact_path.display(), "Model saved");

    Ok(TrainingSummary {
        rows,
        train_rows: train_frame.len(),
        test_rows: test_frame.as_ref().map_or(0, |test| test.len()),
        holdout,
        artifact_path: config.artifact_path.clone(),
    })
}

// Shuffled (train, test) row indices, or `None` when the dataset is not larger
// than `holdout_min_rows`. The test side gets `ceil(rows * test_fraction)` rows.
pub fn holdout_split(rows: usize, config: &ModelConfig) -> Option<(Vec<usize>, Vec<usize>)> {
    if rows <= config.holdout_min_rows || rows < 2 {
        return None;
    }
    let fraction = config.test_fraction.clamp(0.0, 1.0);
    let test_rows = ((rows as f64) * fraction).ceil() as usize;
    let test_rows = test_rows.clamp(1, rows - 1);

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(test_rows);
    Some((train, indices))
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .collect();
    mean(&errors).sqrt()
}

// Coefficient of determination. A constant target scores 1.0 when predicted
// exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean_actual = mean(actual);
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    if ss_tot <= 0.0 {
        return if ss_res <= 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
