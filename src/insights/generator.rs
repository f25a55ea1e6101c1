use serde::Serialize;
use tracing::debug;

use crate::insights::{items, rank_by_mean, scored, InsightStatus, RankedItem};
use crate::HistoricalPost;

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorInsights {
    pub providers: Vec<RankedItem>,
    pub models: Vec<RankedItem>,
    pub temperatures: Vec<RankedItem>,
    pub status: InsightStatus,
    pub message: String,
}

pub fn generator_parameter_performance(posts: &[HistoricalPost]) -> GeneratorInsights {
    if posts.is_empty() {
        return GeneratorInsights {
            providers: Vec::new(),
            models: Vec::new(),
            temperatures: Vec::new(),
            status: InsightStatus::NoHistoricalData,
            message: "No historical data to analyze for generator parameters.".to_string(),
        };
    }

    let providers = items(rank_by_mean(
        scored(posts).filter_map(|(post, score)| post.provider.clone().map(|provider| (provider, score))),
        |provider| provider.clone(),
    ));
    let models = items(rank_by_mean(
        scored(posts).filter_map(|(post, score)| post.model_name.clone().map(|model| (model, score))),
        |model| model.clone(),
    ));
    let temperatures = items(rank_by_mean(
        scored(posts).filter_map(|(post, score)| post.temperature.map(|t| (temperature_bucket(t), score))),
        |bucket| format!("{:.1}", *bucket as f64 / 10.0),
    ));

    let (status, message) = if providers.is_empty() && models.is_empty() && temperatures.is_empty() {
        (
            InsightStatus::NoPatterns,
            "No meaningful generator parameter insights could be generated.",
        )
    } else {
        (InsightStatus::Generated, "Generator parameter insights generated.")
    };

    debug!(
        providers = providers.len(),
        models = models.len(),
        temperatures = temperatures.len(),
        "Generator parameter insights"
    );
    GeneratorInsights {
        providers,
        models,
        temperatures,
        status,
        message: message.to_string(),
    }
}

// Tenths, rounded half away from zero: 0.25 lands in "0.3", where
// half-to-even rounding would put it in "0.2".
fn temperature_bucket(temperature: f64) -> i64 {
    (temperature * 10.0).round() as i64
}
