use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::insights::{rank_by_mean, scored, InsightStatus, RankedItem};
use crate::HistoricalPost;

#[derive(Debug, Clone, Serialize)]
pub struct PostingTimeInsights {
    pub hours: Vec<RankedItem>,
    pub days: Vec<RankedItem>,
    pub best_hour: Option<u32>,
    pub best_day: Option<Weekday>,
    pub status: InsightStatus,
    pub message: String,
}

impl PostingTimeInsights {
    pub fn next_slot(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        next_posting_slot(now, self.best_day?, self.best_hour?)
    }
}

pub fn posting_time_performance(posts: &[HistoricalPost]) -> PostingTimeInsights {
    let mut report = PostingTimeInsights {
        hours: Vec::new(),
        days: Vec::new(),
        best_hour: None,
        best_day: None,
        status: InsightStatus::NoHistoricalData,
        message: "No historical data to analyze for optimal posting times.".to_string(),
    };
    if posts.is_empty() {
        return report;
    }

    let timed: Vec<(u32, Weekday, f64)> = scored(posts)
        .filter_map(|(post, score)| {
            let date = post.post_date?;
            let hour = post.post_hour?;
            Some((u32::from(hour), date.weekday(), score))
        })
        .collect();
    if timed.is_empty() {
        report.status = InsightStatus::NoPatterns;
        report.message = "No valid posting times with engagement scores to analyze.".to_string();
        return report;
    }

    let hours = rank_by_mean(
        timed.iter().map(|&(hour, _, score)| (hour, score)),
        |hour| format!("{:02}:00", hour),
    );
    let days = rank_by_mean(
        timed
            .iter()
            .map(|&(_, day, score)| (day.num_days_from_monday(), score)),
        |day| weekday_name(weekday_from_index(*day)).to_string(),
    );

    report.best_hour = hours.first().map(|(hour, _)| *hour);
    report.best_day = days.first().map(|(day, _)| weekday_from_index(*day));
    report.hours = hours.into_iter().map(|(_, item)| item).collect();
    report.days = days.into_iter().map(|(_, item)| item).collect();
    report.status = InsightStatus::Generated;
    report.message = "Optimal posting time insights generated.".to_string();

    debug!(
        best_hour = ?report.best_hour,
        best_day = ?report.best_day,
        "Posting time insights"
    );
    report
}

// The next `weekday` at `hour:00` after `now`. When today is already that
// weekday and the hour has arrived or passed, the slot moves a week ahead.
// Returns `None` for hours outside 0-23.
pub fn next_posting_slot(now: NaiveDateTime, weekday: Weekday, hour: u32) -> Option<NaiveDateTime> {
    let current = now.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let mut days_ahead = (target + 7 - current) % 7;
    if days_ahead == 0 && hour <= now.hour() {
        days_ahead = 7;
    }
    let date = now.date() + Duration::days(i64::from(days_ahead));
    date.and_hms_opt(hour, 0, 0)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn weekday_from_index(index: u32) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
