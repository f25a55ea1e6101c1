use serde::Serialize;
use tracing::debug;

use crate::config::InsightConfig;
use crate::insights::{quantile, scored, InsightStatus, RankedItem};
use crate::text::{PhraseExtractor, StopWords};
use crate::{HistoricalPost, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PromptSource {
    Text,
    Image,
}

impl PromptSource {
    pub fn label(self) -> &'static str {
        match self {
            PromptSource::Text => "text prompt",
            PromptSource::Image => "image prompt",
        }
    }

    fn english(self, post: &HistoricalPost) -> Option<&str> {
        match self {
            PromptSource::Text => post.text_prompt_en.as_deref(),
            PromptSource::Image => post.image_prompt_en.as_deref(),
        }
    }

    fn arabic(self, post: &HistoricalPost) -> Option<&str> {
        match self {
            PromptSource::Text => post.text_prompt_ar.as_deref(),
            PromptSource::Image => post.image_prompt_ar.as_deref(),
        }
    }

    fn prompt(self, post: &HistoricalPost) -> Option<(Language, &str)> {
        if post.language?.uses_english() {
            self.english(post).map(|p| (Language::English, p))
        } else {
            self.arabic(post).map(|p| (Language::Arabic, p))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhraseInsights {
    pub source: PromptSource,
    pub high: Vec<RankedItem>,
    pub low: Vec<RankedItem>,
    pub thresholds: Option<(f64, f64)>,
    pub status: InsightStatus,
    pub message: String,
}

pub fn text_prompt_performance(posts: &[HistoricalPost], config: &InsightConfig) -> PhraseInsights {
    prompt_phrase_performance(posts, PromptSource::Text, config)
}

pub fn image_prompt_performance(posts: &[HistoricalPost], config: &InsightConfig) -> PhraseInsights {
    prompt_phrase_performance(posts, PromptSource::Image, config)
}

pub fn prompt_phrase_performance(
    posts: &[HistoricalPost],
    source: PromptSource,
    config: &InsightConfig,
) -> PhraseInsights {
    let mut report = PhraseInsights {
        source,
        high: Vec::new(),
        low: Vec::new(),
        thresholds: None,
        status: InsightStatus::NoHistoricalData,
        message: format!("No historical data to analyze for {} performance.", source.label()),
    };
    if posts.is_empty() {
        return report;
    }

    let usable: Vec<(Language, &str, f64)> = scored(posts)
        .filter_map(|(post, score)| source.prompt(post).map(|(language, prompt)| (language, prompt, score)))
        .collect();
    if usable.len() < config.min_prompt_rows {
        debug!(rows = usable.len(), source = source.label(), "Not enough prompts for cohort analysis");
        report.status = InsightStatus::InsufficientData {
            rows: usable.len(),
            required: config.min_prompt_rows,
        };
        report.message = format!(
            "Insufficient data for {} analysis: {} usable posts, need at least {}.",
            source.label(),
            usable.len(),
            config.min_prompt_rows
        );
        return report;
    }

    let scores: Vec<f64> = usable.iter().map(|(_, _, score)| *score).collect();
    let (Some(low_threshold), Some(high_threshold)) = (
        quantile(&scores, config.low_quantile),
        quantile(&scores, config.high_quantile),
    ) else {
        return report;
    };
    report.thresholds = Some((low_threshold, high_threshold));

    report.high = cohort_phrases(&usable, |score| score >= high_threshold, config);
    report.low = cohort_phrases(&usable, |score| score <= low_threshold, config);

    if report.high.is_empty() && report.low.is_empty() {
        report.status = InsightStatus::NoPatterns;
        report.message = format!(
            "No meaningful {} insights could be generated (insufficient data or no distinct patterns).",
            source.label()
        );
    } else {
        report.status = InsightStatus::Generated;
        report.message = format!("{} insights generated.", capitalize(source.label()));
    }

    debug!(
        source = source.label(),
        low_threshold,
        high_threshold,
        high = report.high.len(),
        low = report.low.len(),
        "Prompt phrase insights"
    );
    report
}

fn cohort_phrases<F>(usable: &[(Language, &str, f64)], in_cohort: F, config: &InsightConfig) -> Vec<RankedItem>
where
    F: Fn(f64) -> bool,
{
    let mut merged = Vec::new();
    for (language, tag, stop_words) in [
        (Language::English, "[EN]", StopWords::English),
        (Language::Arabic, "[AR]", StopWords::Arabic),
    ] {
        let documents: Vec<Option<&str>> = usable
            .iter()
            .filter(|(doc_language, _, score)| *doc_language == language && in_cohort(*score))
            .map(|(_, prompt, _)| Some(*prompt))
            .collect();
        if documents.len() < config.min_docs_per_cohort {
            continue;
        }

        let extractor = PhraseExtractor::new(stop_words)
            .with_top_n(config.phrase_top_n)
            .with_max_features(Some(config.phrase_max_features));
        merged.extend(extractor.extract(&documents).into_iter().map(|phrase| RankedItem {
            label: format!("{} {}", tag, phrase.phrase),
            score: phrase.weight,
            samples: documents.len(),
        }));
    }
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
