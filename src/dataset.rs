use std::path::Path;

use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::HistoricalPost;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub derive_missing_scores: bool,
}

pub fn load_posts(path: &Path, options: LoadOptions) -> Result<Vec<HistoricalPost>> {
    let data = std::fs::read_to_string(path).map_err(|err| {
        EngineError::InvalidDataset(format!("failed to read {}: {}", path.display(), err))
    })?;
    let mut posts = parse_posts(&data)?;

    if options.derive_missing_scores {
        let mut derived = 0usize;
        for post in posts.iter_mut().filter(|post| post.engagement_score.is_none()) {
            post.engagement_score = Some(post.derived_engagement_score());
            derived += 1;
        }
        debug!(derived, "Filled missing engagement scores from raw metrics");
    }

    validate_posts(&posts)?;
    info!(rows = posts.len(), path = %path.display(), "Loaded historical posts");
    Ok(posts)
}

pub fn parse_posts(data: &str) -> Result<Vec<HistoricalPost>> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(data)
        .map_err(|err| EngineError::InvalidDataset(format!("failed to parse posts: {}", err)))
}

pub fn validate_posts(posts: &[HistoricalPost]) -> Result<()> {
    for (index, post) in posts.iter().enumerate() {
        let label = post
            .id
            .map(|id| format!("post {}", id))
            .unwrap_or_else(|| format!("row {}", index));

        if let Some(score) = post.engagement_score {
            if !score.is_finite() || score < 0.0 {
                return Err(EngineError::InvalidDataset(format!(
                    "{} has engagement score {}, expected a finite value >= 0",
                    label, score
                )));
            }
        }
        if let Some(hour) = post.post_hour {
            if hour > 23 {
                return Err(EngineError::InvalidDataset(format!(
                    "{} has post hour {}, expected 0-23",
                    label, hour
                )));
            }
        }
        if let Some(temperature) = post.temperature {
            if !temperature.is_finite() {
                return Err(EngineError::InvalidDataset(format!(
                    "{} has non-finite temperature",
                    label
                )));
            }
        }
    }
    Ok(())
}
