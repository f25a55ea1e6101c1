pub mod generator;
pub mod language;
pub mod posting_time;
pub mod prompts;
pub mod topic;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::InsightConfig;
use crate::HistoricalPost;

pub use generator::{generator_parameter_performance, GeneratorInsights};
pub use language::{language_preference, LanguageInsights};
pub use posting_time::{next_posting_slot, posting_time_performance, weekday_name, PostingTimeInsights};
pub use prompts::{
    image_prompt_performance, prompt_phrase_performance, text_prompt_performance, PhraseInsights, PromptSource,
};
pub use topic::{topic_performance, TopicInsights};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub label: String,
    pub score: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightStatus {
    Generated,
    NoHistoricalData,
    InsufficientData { rows: usize, required: usize },
    NoPatterns,
}

impl InsightStatus {
    pub fn is_generated(self) -> bool {
        matches!(self, InsightStatus::Generated)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightSuite {
    pub topics: TopicInsights,
    pub text_prompts: PhraseInsights,
    pub image_prompts: PhraseInsights,
    pub posting_times: PostingTimeInsights,
    pub generator: GeneratorInsights,
    pub languages: LanguageInsights,
}

pub fn all_insights(posts: &[HistoricalPost], config: &InsightConfig) -> InsightSuite {
    InsightSuite {
        topics: topic_performance(posts, config),
        text_prompts: text_prompt_performance(posts, config),
        image_prompts: image_prompt_performance(posts, config),
        posting_times: posting_time_performance(posts),
        generator: generator_parameter_performance(posts),
        languages: language_preference(posts),
    }
}

// Averages scores per key and returns `(key, item)` pairs, best mean first.
// Equal means keep key order.
pub(crate) fn rank_by_mean<K, I, F>(entries: I, label: F) -> Vec<(K, RankedItem)>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
    F: Fn(&K) -> String,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for (key, score) in entries {
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let mut ranked: Vec<(K, RankedItem)> = groups
        .into_iter()
        .map(|(key, (sum, count))| {
            let item = RankedItem {
                label: label(&key),
                score: sum / count as f64,
                samples: count,
            };
            (key, item)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
    ranked
}

pub(crate) fn items<K>(ranked: Vec<(K, RankedItem)>) -> Vec<RankedItem> {
    ranked.into_iter().map(|(_, item)| item).collect()
}

pub(crate) fn scored<'a>(
    posts: &'a [HistoricalPost],
) -> impl Iterator<Item = (&'a HistoricalPost, f64)> + 'a {
    posts
        .iter()
        .filter_map(|post| post.engagement_score.map(|score| (post, score)))
}

// Quantile with linear interpolation between closest ranks.
pub(crate) fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
