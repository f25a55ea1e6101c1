use serde::Serialize;
use tracing::debug;

use crate::config::InsightConfig;
use crate::insights::{items, rank_by_mean, scored, InsightStatus, RankedItem};
use crate::HistoricalPost;

#[derive(Debug, Clone, Serialize)]
pub struct TopicInsights {
    pub ranked: Vec<RankedItem>,
    pub high: Vec<RankedItem>,
    pub low: Vec<RankedItem>,
    pub status: InsightStatus,
    pub message: String,
}

impl TopicInsights {
    fn empty(status: InsightStatus, message: &str) -> Self {
        Self {
            ranked: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            status,
            message: message.to_string(),
        }
    }
}

// Reports `min(max_topic_suggestions, max(topics / 2, 1))` topics from each
// end of the ranking. With a single topic there is nothing to contrast it
// with, so the low list stays empty.
pub fn topic_performance(posts: &[HistoricalPost], config: &InsightConfig) -> TopicInsights {
    if posts.is_empty() {
        return TopicInsights::empty(
            InsightStatus::NoHistoricalData,
            "No historical data to analyze for topic performance.",
        );
    }

    let ranked = items(rank_by_mean(
        scored(posts).filter_map(|(post, score)| post.topic.clone().map(|topic| (topic, score))),
        |topic| topic.clone(),
    ));
    if ranked.is_empty() {
        return TopicInsights::empty(
            InsightStatus::NoPatterns,
            "No topics with recorded engagement scores to analyze.",
        );
    }

    let count = ranked.len();
    let suggestions = config.max_topic_suggestions.min((count / 2).max(1));
    let high = ranked[..suggestions].to_vec();
    let (low, message) = if count < 2 {
        (
            Vec::new(),
            "Topic performance insights generated. Only one topic recorded, so no low performers are reported.",
        )
    } else {
        (ranked[count - suggestions..].to_vec(), "Topic performance insights generated.")
    };

    debug!(topics = count, high = high.len(), low = low.len(), "Topic insights");
    TopicInsights {
        ranked,
        high,
        low,
        status: InsightStatus::Generated,
        message: message.to_string(),
    }
}
