use chrono::{NaiveDate, NaiveDateTime, Weekday};
use engagement_engine::insights::{
    all_insights, generator_parameter_performance, image_prompt_performance, language_preference, next_posting_slot,
    posting_time_performance, text_prompt_performance, topic_performance, InsightStatus, PromptSource, RankedItem,
};
use engagement_engine::{HistoricalPost, InsightConfig, Language};

fn scored(score: f64) -> HistoricalPost {
    HistoricalPost {
        engagement_score: Some(score),
        ..HistoricalPost::default()
    }
}

fn topic_post(topic: &str, score: f64) -> HistoricalPost {
    HistoricalPost {
        topic: Some(topic.to_string()),
        ..scored(score)
    }
}

fn timed_post(date: NaiveDate, hour: u8, score: f64) -> HistoricalPost {
    HistoricalPost {
        post_date: Some(date),
        post_hour: Some(hour),
        ..scored(score)
    }
}

fn prompt_post(language: Language, prompt_en: Option<&str>, prompt_ar: Option<&str>, score: f64) -> HistoricalPost {
    HistoricalPost {
        language: Some(language),
        text_prompt_en: prompt_en.map(str::to_string),
        text_prompt_ar: prompt_ar.map(str::to_string),
        ..scored(score)
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0).unwrap()
}

fn labels(items: &[RankedItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

fn assert_non_increasing(items: &[RankedItem]) {
    for pair in items.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "{} ({}) ranked above {} ({})",
            pair[0].label,
            pair[0].score,
            pair[1].label,
            pair[1].score
        );
    }
}

#[test]
fn topic_means_are_ranked() {
    let posts = vec![topic_post("A", 0.8), topic_post("A", 0.6), topic_post("B", 0.2)];
    let report = topic_performance(&posts, &InsightConfig::default());

    assert_eq!(report.status, InsightStatus::Generated);
    assert_eq!(labels(&report.ranked), vec!["A", "B"]);
    assert!((report.ranked[0].score - 0.7).abs() < 1e-12);
    assert_eq!(report.ranked[0].samples, 2);
    assert!((report.ranked[1].score - 0.2).abs() < 1e-12);
    assert_eq!(labels(&report.high), vec!["A"]);
    assert_eq!(labels(&report.low), vec!["B"]);
}

#[test]
fn topic_lists_are_capped_and_sorted() {
    let posts: Vec<HistoricalPost> = (0..7)
        .map(|i| topic_post(&format!("topic-{}", i), 0.1 * (i % 4) as f64 + 0.01 * i as f64))
        .collect();
    let config = InsightConfig::default();
    let report = topic_performance(&posts, &config);

    assert_eq!(report.ranked.len(), 7);
    assert_eq!(report.high.len(), 3);
    assert_eq!(report.low.len(), 3);
    assert_non_increasing(&report.ranked);
    assert_non_increasing(&report.high);
    assert_non_increasing(&report.low);
    assert_eq!(report.high, report.ranked[..3].to_vec());
    assert_eq!(report.low, report.ranked[4..].to_vec());

    let narrow = InsightConfig {
        max_topic_suggestions: 1,
        ..InsightConfig::default()
    };
    assert_eq!(topic_performance(&posts, &narrow).high.len(), 1);
}

#[test]
fn single_topic_has_no_low_list() {
    let posts = vec![topic_post("Solo", 0.4), topic_post("Solo", 0.6)];
    let report = topic_performance(&posts, &InsightConfig::default());

    assert_eq!(labels(&report.high), vec!["Solo"]);
    assert!(report.low.is_empty());
    assert!(report.status.is_generated());
}

#[test]
fn unscored_posts_are_ignored() {
    let mut unscored = topic_post("Ghost", 0.0);
    unscored.engagement_score = None;
    let posts = vec![unscored, topic_post("Real", 0.5)];

    let report = topic_performance(&posts, &InsightConfig::default());
    assert_eq!(labels(&report.ranked), vec!["Real"]);
}

#[test]
fn empty_dataset_reports_no_history_everywhere() {
    let suite = all_insights(&[], &InsightConfig::default());
    assert_eq!(suite.topics.status, InsightStatus::NoHistoricalData);
    assert_eq!(suite.text_prompts.status, InsightStatus::NoHistoricalData);
    assert_eq!(suite.image_prompts.status, InsightStatus::NoHistoricalData);
    assert_eq!(suite.posting_times.status, InsightStatus::NoHistoricalData);
    assert_eq!(suite.generator.status, InsightStatus::NoHistoricalData);
    assert_eq!(suite.languages.status, InsightStatus::NoHistoricalData);
    assert!(suite.topics.high.is_empty());
    assert!(suite.posting_times.hours.is_empty());
    assert!(!suite.topics.message.is_empty());
}

#[test]
fn insights_are_idempotent() {
    let posts = vec![
        topic_post("A", 0.8),
        topic_post("B", 0.3),
        timed_post(monday(), 9, 0.5),
        prompt_post(Language::English, Some("bright morning light"), None, 0.4),
    ];
    let config = InsightConfig::default();
    let first = serde_json::to_string(&all_insights(&posts, &config)).unwrap();
    let second = serde_json::to_string(&all_insights(&posts, &config)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn hours_are_ranked_by_mean() {
    let posts = vec![
        timed_post(monday(), 9, 0.9),
        timed_post(monday(), 9, 0.7),
        timed_post(monday(), 14, 0.3),
    ];
    let report = posting_time_performance(&posts);

    assert_eq!(report.status, InsightStatus::Generated);
    assert_eq!(labels(&report.hours), vec!["09:00", "14:00"]);
    assert!((report.hours[0].score - 0.8).abs() < 1e-12);
    assert!((report.hours[1].score - 0.3).abs() < 1e-12);
    assert_eq!(report.best_hour, Some(9));
    assert_eq!(report.best_day, Some(Weekday::Mon));
    assert_eq!(labels(&report.days), vec!["Monday"]);
}

#[test]
fn days_use_full_weekday_names() {
    let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
    let posts = vec![
        timed_post(monday(), 9, 0.2),
        timed_post(friday, 18, 0.6),
        timed_post(friday, 20, 0.4),
    ];
    let report = posting_time_performance(&posts);
    assert_eq!(labels(&report.days), vec!["Friday", "Monday"]);
    assert!((report.days[0].score - 0.5).abs() < 1e-12);
    assert_eq!(report.best_day, Some(Weekday::Fri));
    assert_eq!(report.best_hour, Some(18));
    assert_non_increasing(&report.hours);
}

#[test]
fn posts_without_time_give_no_patterns() {
    let report = posting_time_performance(&[scored(0.5)]);
    assert_eq!(report.status, InsightStatus::NoPatterns);
    assert!(report.best_hour.is_none());
    assert!(report.next_slot(at(monday(), 8, 0)).is_none());
}

#[test]
fn next_slot_rolls_forward_when_hour_has_passed() {
    let now = at(monday(), 10, 30);

    assert_eq!(
        next_posting_slot(now, Weekday::Mon, 9),
        Some(at(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(), 9, 0))
    );
    assert_eq!(
        next_posting_slot(now, Weekday::Mon, 10),
        Some(at(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(), 10, 0))
    );
    assert_eq!(next_posting_slot(now, Weekday::Mon, 11), Some(at(monday(), 11, 0)));
    assert_eq!(
        next_posting_slot(now, Weekday::Wed, 8),
        Some(at(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(), 8, 0))
    );
    assert_eq!(
        next_posting_slot(now, Weekday::Sun, 23),
        Some(at(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 23, 0))
    );
    assert_eq!(next_posting_slot(now, Weekday::Tue, 24), None);
}

#[test]
fn report_next_slot_uses_best_day_and_hour() {
    let posts = vec![
        timed_post(monday(), 9, 0.9),
        timed_post(monday(), 9, 0.7),
        timed_post(monday(), 14, 0.3),
    ];
    let report = posting_time_performance(&posts);
    let sunday_night = at(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 22, 0);
    assert_eq!(
        report.next_slot(sunday_night),
        Some(at(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(), 9, 0))
    );
}

#[test]
fn prompt_analysis_needs_four_rows() {
    let config = InsightConfig::default();
    let three = vec![
        prompt_post(Language::English, Some("city lights at night"), None, 0.1),
        prompt_post(Language::English, Some("quiet forest trail"), None, 0.5),
        prompt_post(Language::English, Some("busy market stalls"), None, 0.9),
    ];
    let report = text_prompt_performance(&three, &config);
    assert_eq!(report.status, InsightStatus::InsufficientData { rows: 3, required: 4 });
    assert!(report.thresholds.is_none());
    assert!(report.high.is_empty() && report.low.is_empty());

    let mut four = three.clone();
    four.push(prompt_post(Language::English, Some("snowy peaks"), None, 0.2));
    let report = text_prompt_performance(&four, &config);
    assert!(report.thresholds.is_some());
    assert_ne!(report.status, InsightStatus::InsufficientData { rows: 4, required: 4 });
}

#[test]
fn single_document_cohorts_are_skipped() {
    let posts = vec![
        prompt_post(Language::English, Some("city lights at night"), None, 0.1),
        prompt_post(Language::English, Some("quiet forest trail"), None, 0.2),
        prompt_post(Language::English, Some("busy market stalls"), None, 0.8),
        prompt_post(Language::English, Some("snowy peaks"), None, 0.9),
    ];
    let report = text_prompt_performance(&posts, &InsightConfig::default());

    let (low, high) = report.thresholds.unwrap();
    assert!((low - 0.175).abs() < 1e-12);
    assert!((high - 0.825).abs() < 1e-12);
    assert!(report.high.is_empty());
    assert!(report.low.is_empty());
    assert_eq!(report.status, InsightStatus::NoPatterns);
}

#[test]
fn cohort_phrases_are_tagged_by_language() {
    let posts = vec![
        prompt_post(Language::English, Some("office desk memo"), None, 0.1),
        prompt_post(Language::English, Some("office budget memo"), None, 0.1),
        prompt_post(Language::English, Some("rainy commute"), None, 0.2),
        prompt_post(Language::English, Some("lunch break"), None, 0.3),
        prompt_post(Language::English, Some("weekend plans"), None, 0.6),
        prompt_post(Language::English, Some("garden flowers"), None, 0.7),
        prompt_post(Language::English, Some("sunrise beach photo"), None, 0.9),
        prompt_post(Language::Both, Some("sunrise mountain photo"), Some("شروق الجبل"), 0.9),
    ];
    let report = text_prompt_performance(&posts, &InsightConfig::default());

    assert_eq!(report.status, InsightStatus::Generated);
    assert_eq!(report.source, PromptSource::Text);
    assert!(report.high.len() <= 5);
    assert!(report.high.iter().all(|item| item.label.starts_with("[EN] ")));
    assert!(report.high.iter().all(|item| item.samples == 2));
    let high = labels(&report.high);
    assert!(high.contains(&"[EN] sunrise"), "{:?}", high);
    assert!(high.contains(&"[EN] photo"), "{:?}", high);
    let low = labels(&report.low);
    assert!(low.contains(&"[EN] office"), "{:?}", low);
    assert!(low.contains(&"[EN] memo"), "{:?}", low);
    assert_non_increasing(&report.high);
    assert_non_increasing(&report.low);
}

#[test]
fn arabic_posts_are_judged_by_arabic_prompts() {
    let posts = vec![
        prompt_post(Language::Arabic, Some("ignored english"), Some("عرض خاص اليوم"), 0.9),
        prompt_post(Language::Arabic, Some("ignored english"), Some("عرض جديد اليوم"), 0.9),
        prompt_post(Language::Arabic, None, Some("خبر عادي"), 0.5),
        prompt_post(Language::Arabic, None, Some("تذكير قصير"), 0.1),
        prompt_post(Language::Arabic, None, Some("تنبيه صغير"), 0.1),
    ];
    let report = text_prompt_performance(&posts, &InsightConfig::default());

    assert!(report.high.iter().all(|item| item.label.starts_with("[AR] ")));
    let high = labels(&report.high);
    assert!(high.contains(&"[AR] عرض"), "{:?}", high);
    assert!(high.contains(&"[AR] اليوم"), "{:?}", high);
    assert!(!high.iter().any(|label| label.contains("ignored")));
}

#[test]
fn arabic_posts_without_arabic_prompts_are_unusable() {
    let posts: Vec<HistoricalPost> = (0..5)
        .map(|i| prompt_post(Language::Arabic, Some("english only"), None, 0.1 * i as f64))
        .collect();
    let report = text_prompt_performance(&posts, &InsightConfig::default());
    assert_eq!(report.status, InsightStatus::InsufficientData { rows: 0, required: 4 });
}

#[test]
fn image_prompts_are_analyzed_separately() {
    let posts: Vec<HistoricalPost> = [
        ("neon street portrait", 0.9),
        ("neon skyline portrait", 0.9),
        ("plain wall", 0.5),
        ("dusty table", 0.1),
        ("dusty chair", 0.1),
    ]
    .iter()
    .map(|(prompt, score)| HistoricalPost {
        language: Some(Language::English),
        text_prompt_en: Some("unrelated text prompt".to_string()),
        image_prompt_en: Some(prompt.to_string()),
        ..scored(*score)
    })
    .collect();

    let report = image_prompt_performance(&posts, &InsightConfig::default());
    assert_eq!(report.source, PromptSource::Image);
    let high = labels(&report.high);
    assert!(high.contains(&"[EN] neon"), "{:?}", high);
    assert!(high.contains(&"[EN] portrait"), "{:?}", high);
    assert!(!high.iter().any(|label| label.contains("unrelated")));
    assert!(labels(&report.low).contains(&"[EN] dusty"));
}

#[test]
fn generator_dimensions_are_reported_separately() {
    let post = |provider: &str, model: &str, temperature: f64, score: f64| HistoricalPost {
        provider: Some(provider.to_string()),
        model_name: Some(model.to_string()),
        temperature: Some(temperature),
        ..scored(score)
    };
    let posts = vec![
        post("gemini", "gemini-pro", 0.7, 0.6),
        post("gemini", "gemini-flash", 0.72, 0.4),
        post("openai", "gpt-4o", 0.75, 0.2),
    ];
    let report = generator_parameter_performance(&posts);

    assert_eq!(report.status, InsightStatus::Generated);
    assert_eq!(labels(&report.providers), vec!["gemini", "openai"]);
    assert!((report.providers[0].score - 0.5).abs() < 1e-12);
    assert_eq!(labels(&report.models), vec!["gemini-pro", "gemini-flash", "gpt-4o"]);
    assert_eq!(labels(&report.temperatures), vec!["0.7", "0.8"]);
    assert_eq!(report.temperatures[0].samples, 2);
}

#[test]
fn temperature_halves_round_away_from_zero() {
    let post = |temperature: f64, score: f64| HistoricalPost {
        provider: Some("gemini".to_string()),
        model_name: Some("gemini-pro".to_string()),
        temperature: Some(temperature),
        ..scored(score)
    };
    let report = generator_parameter_performance(&[post(0.25, 0.9), post(0.3, 0.5), post(0.2, 0.1)]);

    assert_eq!(labels(&report.temperatures), vec!["0.3", "0.2"]);
    assert_eq!(report.temperatures[0].samples, 2);
    assert!((report.temperatures[0].score - 0.7).abs() < 1e-12);
}

#[test]
fn languages_are_ranked_by_mean() {
    let post = |language: Language, score: f64| HistoricalPost {
        language: Some(language),
        ..scored(score)
    };
    let posts = vec![
        post(Language::English, 0.4),
        post(Language::Arabic, 0.7),
        post(Language::Arabic, 0.5),
        post(Language::Both, 0.5),
    ];
    let report = language_preference(&posts);

    assert_eq!(report.status, InsightStatus::Generated);
    assert_eq!(labels(&report.ranked), vec!["Arabic", "Both", "English"]);
    assert!((report.ranked[0].score - 0.6).abs() < 1e-12);
    assert_eq!(report.ranked[0].samples, 2);
}
