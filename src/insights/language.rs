use serde::Serialize;

use crate::insights::{items, rank_by_mean, scored, InsightStatus, RankedItem};
use crate::HistoricalPost;

#[derive(Debug, Clone, Serialize)]
pub struct LanguageInsights {
    pub ranked: Vec<RankedItem>,
    pub status: InsightStatus,
    pub message: String,
}

pub fn language_preference(posts: &[HistoricalPost]) -> LanguageInsights {
    if posts.is_empty() {
        return LanguageInsights {
            ranked: Vec::new(),
            status: InsightStatus::NoHistoricalData,
            message: "No historical data to analyze for language preference.".to_string(),
        };
    }

    let ranked = items(rank_by_mean(
        scored(posts).filter_map(|(post, score)| post.language.map(|language| (language, score))),
        |language| language.label().to_string(),
    ));
    let (status, message) = if ranked.is_empty() {
        (
            InsightStatus::NoPatterns,
            "No meaningful language preference insights could be generated.",
        )
    } else {
        (InsightStatus::Generated, "Language preference insights generated.")
    };

    LanguageInsights {
        ranked,
        status,
        message: message.to_string(),
    }
}
