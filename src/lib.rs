pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod insights;
pub mod model;
pub mod predictor;
pub mod text;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

pub use crate::config::{EngineConfig, InsightConfig, ModelConfig};
pub use crate::error::{EngineError, Result};
pub use crate::model::{train, TrainOutcome, TrainingSummary};
pub use crate::predictor::{predict, CachedPredictor, Predictor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Language {
    English,
    Arabic,
    Both,
}

impl FromStr for Language {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "arabic" | "ar" => Ok(Language::Arabic),
            "both" | "bilingual" => Ok(Language::Both),
            other => Err(EngineError::InvalidDataset(format!("unknown language '{}'", other))),
        }
    }
}

// Blank or unrecognised labels leave the post out of language groupings
// instead of rejecting the whole export.
fn lenient_language<'de, D>(deserializer: D) -> std::result::Result<Option<Language>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|label| {
        if label.trim().is_empty() {
            return None;
        }
        match label.parse() {
            Ok(language) => Some(language),
            Err(err) => {
                tracing::warn!("ignoring language label: {}", err);
                None
            }
        }
    }))
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "Arabic",
            Language::Both => "Both",
        }
    }

    pub fn uses_english(self) -> bool {
        matches!(self, Language::English | Language::Both)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalPost {
    pub id: Option<i64>,
    pub topic: Option<String>,
    #[serde(deserialize_with = "lenient_language")]
    pub language: Option<Language>,
    #[serde(alias = "text_gen_provider")]
    pub provider: Option<String>,
    #[serde(alias = "text_gen_model")]
    pub model_name: Option<String>,
    #[serde(alias = "gemini_temperature")]
    pub temperature: Option<f64>,
    pub content_en: Option<String>,
    pub content_ar: Option<String>,
    #[serde(alias = "text_gen_prompt_en")]
    pub text_prompt_en: Option<String>,
    #[serde(alias = "text_gen_prompt_ar")]
    pub text_prompt_ar: Option<String>,
    pub image_prompt_en: Option<String>,
    pub image_prompt_ar: Option<String>,
    pub post_date: Option<NaiveDate>,
    pub post_hour: Option<u8>,
    pub engagement_score: Option<f64>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub reach: u64,
}

impl HistoricalPost {
    pub fn derived_engagement_score(&self) -> f64 {
        if self.reach == 0 {
            return 0.0;
        }
        let interactions = self.likes + self.comments + self.shares;
        interactions as f64 / self.reach as f64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatePost {
    pub topic: String,
    pub language: String,
    #[serde(alias = "text_gen_provider")]
    pub provider: String,
    #[serde(alias = "text_gen_model")]
    pub model_name: String,
    #[serde(alias = "gemini_temperature")]
    pub temperature: f64,
    pub content: String,
    #[serde(alias = "text_gen_prompt_en")]
    pub text_prompt_en: String,
    #[serde(alias = "text_gen_prompt_ar")]
    pub text_prompt_ar: String,
}

impl CandidatePost {
    /// Candidate a historical post would have been before publishing. Content is
    /// chosen as in training; other absent fields take the candidate defaults
    /// (`""`, `0.0`), not the training imputation.
    pub fn from_post(post: &HistoricalPost) -> Self {
        Self {
            topic: post.topic.clone().unwrap_or_default(),
            language: post
                .language
                .map(|language| language.label().to_string())
                .unwrap_or_default(),
            provider: post.provider.clone().unwrap_or_default(),
            model_name: post.model_name.clone().unwrap_or_default(),
            temperature: post.temperature.unwrap_or(0.0),
            content: features::select_content(post)
                .map(str::to_string)
                .unwrap_or_default(),
            text_prompt_en: post.text_prompt_en.clone().unwrap_or_default(),
            text_prompt_ar: post.text_prompt_ar.clone().unwrap_or_default(),
        }
    }
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
