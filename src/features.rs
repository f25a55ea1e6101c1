use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::{CandidatePost, HistoricalPost, Language};

pub const TEXT_COLUMN: &str = "combined_text";
pub const CATEGORICAL_COLUMNS: [&str; 4] = ["topic", "language", "provider", "model_name"];
pub const NUMERIC_COLUMNS: [&str; 1] = ["temperature"];
pub const MISSING_CATEGORY: &str = "missing";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub combined_text: String,
    pub topic: String,
    pub language: String,
    pub provider: String,
    pub model_name: String,
    pub temperature: f64,
}

impl FeatureRow {
    pub fn from_candidate(candidate: &CandidatePost) -> Self {
        let combined_text = format!(
            "{} {} {}",
            candidate.content, candidate.text_prompt_en, candidate.text_prompt_ar
        );
        Self {
            combined_text,
            topic: candidate.topic.clone(),
            language: candidate.language.clone(),
            provider: candidate.provider.clone(),
            model_name: candidate.model_name.clone(),
            temperature: candidate.temperature,
        }
    }

    pub fn categorical_values(&self) -> [&str; 4] {
        [
            self.topic.as_str(),
            self.language.as_str(),
            self.provider.as_str(),
            self.model_name.as_str(),
        ]
    }

    pub fn numeric_values(&self) -> [f64; 1] {
        [self.temperature]
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
    pub post_ids: Vec<Option<i64>>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn subset(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            post_ids: indices.iter().map(|&i| self.post_ids[i]).collect(),
        }
    }
}

// English content for English posts and for bilingual posts that have it,
// Arabic content otherwise.
pub fn select_content(post: &HistoricalPost) -> Option<&str> {
    let english_first = match post.language {
        Some(Language::English) => true,
        Some(Language::Both) => post.content_en.is_some(),
        Some(Language::Arabic) | None => false,
    };
    if english_first {
        post.content_en.as_deref()
    } else {
        post.content_ar.as_deref()
    }
}

pub fn build_training_frame(posts: &[HistoricalPost]) -> Result<FeatureFrame> {
    if posts.is_empty() {
        return Err(EngineError::NoHistoricalData(
            "no historical posts to train on".to_string(),
        ));
    }

    let with_content: Vec<(&HistoricalPost, &str)> = posts
        .iter()
        .filter_map(|post| select_content(post).map(|content| (post, content)))
        .collect();
    if with_content.is_empty() {
        return Err(EngineError::NoHistoricalData(
            "no post has content in its selected language".to_string(),
        ));
    }
    let dropped = posts.len() - with_content.len();
    if dropped > 0 {
        debug!(dropped, "Dropped posts without content");
    }

    let temperatures: Vec<f64> = with_content
        .iter()
        .filter_map(|(post, _)| post.temperature)
        .collect();
    let temperature_fill = median(&temperatures).unwrap_or(0.0);

    let mut frame = FeatureFrame::default();
    for (post, content) in with_content {
        let Some(target) = post.engagement_score else {
            continue;
        };
        let candidate = imputed_candidate(post, content, temperature_fill);
        frame.rows.push(FeatureRow::from_candidate(&candidate));
        frame.targets.push(target);
        frame.post_ids.push(post.id);
    }

    if frame.is_empty() {
        return Err(EngineError::NoValidTargets);
    }
    if frame.len() < 5 {
        warn!(rows = frame.len(), "Very few rows for training; predictions will be rough");
    }
    Ok(frame)
}

fn imputed_candidate(post: &HistoricalPost, content: &str, temperature_fill: f64) -> CandidatePost {
    let category = |value: &Option<String>| {
        value
            .clone()
            .unwrap_or_else(|| MISSING_CATEGORY.to_string())
    };
    CandidatePost {
        topic: category(&post.topic),
        language: post
            .language
            .map(|language| language.label().to_string())
            .unwrap_or_else(|| MISSING_CATEGORY.to_string()),
        provider: category(&post.provider),
        model_name: category(&post.model_name),
        temperature: post.temperature.unwrap_or(temperature_fill),
        content: content.to_string(),
        text_prompt_en: post.text_prompt_en.clone().unwrap_or_default(),
        text_prompt_ar: post.text_prompt_ar.clone().unwrap_or_default(),
    }
}

pub fn schema_columns() -> Vec<&'static str> {
    let mut columns = vec![TEXT_COLUMN];
    columns.extend(CATEGORICAL_COLUMNS);
    columns.extend(NUMERIC_COLUMNS);
    columns
}

pub fn schema_fingerprint() -> String {
    format!("{:016x}", stable_hash64(&schema_columns().join("|")))
}

fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
