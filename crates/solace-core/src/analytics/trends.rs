//! **TrendAggregator**: pure summaries over a snapshot of the analytics log.
//!
//! Maps are `BTreeMap`s so iteration, ties and JSON output are stable. The `*_at`
//! variants take the reference instant explicitly.

use super::store::AnalyticsStore;
use crate::error::WellnessResult;
use crate::shared::MoodRecord;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const WEEK_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_entries: usize,
    pub unique_days: usize,
}

/// Everything the dashboard draws, from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub generated_at: DateTime<Utc>,
    pub weekly_mood_counts: BTreeMap<String, usize>,
    pub dominant_weekly_mood: Option<String>,
    pub average_confidence: f64,
    pub usage: UsageStats,
    pub daily_trend: BTreeMap<NaiveDate, Vec<String>>,
    pub daily_mood_counts: BTreeMap<NaiveDate, BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, Default)]
pub struct TrendAggregator {
    records: Vec<MoodRecord>,
}

impl TrendAggregator {
    pub fn new(records: Vec<MoodRecord>) -> Self {
        Self { records }
    }

    pub fn from_store(store: &AnalyticsStore) -> WellnessResult<Self> {
        Ok(Self::new(store.load_all()?))
    }

    pub fn records(&self) -> &[MoodRecord] {
        &self.records
    }

    pub fn weekly_mood_counts(&self) -> BTreeMap<String, usize> {
        self.weekly_mood_counts_at(Utc::now())
    }

    pub fn weekly_mood_counts_at(&self, now: DateTime<Utc>) -> BTreeMap<String, usize> {
        let cutoff = now - Duration::days(WEEK_WINDOW_DAYS);
        let mut counts = BTreeMap::new();
        for r in self.records.iter().filter(|r| r.timestamp >= cutoff) {
            *counts.entry(r.mood.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// All records grouped by UTC date, in append order within each day.
    pub fn daily_trend(&self) -> BTreeMap<NaiveDate, Vec<String>> {
        let mut days: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for r in &self.records {
            days.entry(r.timestamp.date_naive()).or_default().push(r.mood.clone());
        }
        days
    }

    pub fn daily_mood_counts(&self) -> BTreeMap<NaiveDate, BTreeMap<String, usize>> {
        let mut days: BTreeMap<NaiveDate, BTreeMap<String, usize>> = BTreeMap::new();
        for r in &self.records {
            *days
                .entry(r.timestamp.date_naive())
                .or_default()
                .entry(r.mood.clone())
                .or_insert(0) += 1;
        }
        days
    }

    pub fn dominant_weekly_mood(&self) -> Option<String> {
        self.dominant_weekly_mood_at(Utc::now())
    }

    pub fn dominant_weekly_mood_at(&self, now: DateTime<Utc>) -> Option<String> {
        dominant(&self.weekly_mood_counts_at(now))
    }

    /// Mean of the recorded confidences; 0.0 when none are recorded.
    pub fn average_confidence(&self) -> f64 {
        let values: Vec<f64> = self.records.iter().filter_map(|r| r.confidence).collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub fn usage_stats(&self) -> UsageStats {
        let days: BTreeSet<NaiveDate> = self.records.iter().map(|r| r.timestamp.date_naive()).collect();
        UsageStats {
            total_entries: self.records.len(),
            unique_days: days.len(),
        }
    }

    pub fn report(&self) -> TrendReport {
        self.report_at(Utc::now())
    }

    pub fn report_at(&self, now: DateTime<Utc>) -> TrendReport {
        let weekly = self.weekly_mood_counts_at(now);
        TrendReport {
            generated_at: now,
            dominant_weekly_mood: dominant(&weekly),
            weekly_mood_counts: weekly,
            average_confidence: self.average_confidence(),
            usage: self.usage_stats(),
            daily_trend: self.daily_trend(),
            daily_mood_counts: self.daily_mood_counts(),
        }
    }
}

/// Highest count wins; among equal counts the alphabetically first label.
pub fn dominant(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (mood, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((mood, count));
        }
    }
    best.map(|(m, _)| m.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(ts: DateTime<Utc>, mood: &str, confidence: Option<f64>) -> MoodRecord {
        MoodRecord {
            timestamp: ts,
            mood: mood.to_string(),
            confidence,
            message: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn weekly_window_excludes_eight_days_ago() {
        let agg = TrendAggregator::new(vec![
            rec(now() - Duration::days(8), "sad", Some(0.5)),
            rec(now() - Duration::days(3), "anxious", Some(0.7)),
        ]);
        let counts = agg.weekly_mood_counts_at(now());
        assert_eq!(counts.get("anxious"), Some(&1));
        assert!(!counts.contains_key("sad"));
    }

    #[test]
    fn empty_log_has_no_weekly_counts_or_dominant() {
        let agg = TrendAggregator::default();
        assert!(agg.weekly_mood_counts_at(now()).is_empty());
        assert_eq!(agg.dominant_weekly_mood_at(now()), None);
        assert_eq!(agg.average_confidence(), 0.0);
        assert_eq!(agg.usage_stats(), UsageStats::default());
    }

    #[test]
    fn ties_resolve_alphabetically() {
        let counts = BTreeMap::from([
            ("sad".to_string(), 2),
            ("anxious".to_string(), 2),
            ("happy".to_string(), 1),
        ]);
        assert_eq!(dominant(&counts).as_deref(), Some("anxious"));
    }

    #[test]
    fn dominant_prefers_higher_count() {
        let t = now() - Duration::hours(1);
        let agg = TrendAggregator::new(vec![
            rec(t, "anxious", None),
            rec(t, "sad", None),
            rec(t, "sad", None),
        ]);
        assert_eq!(agg.dominant_weekly_mood_at(now()).as_deref(), Some("sad"));
    }

    #[test]
    fn daily_trend_groups_by_date_in_order() {
        let d1 = Utc.with_ymd_and_hms(2025, 3, 18, 9, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2025, 3, 19, 23, 59, 0).unwrap();
        let agg = TrendAggregator::new(vec![
            rec(d1, "sad", Some(0.2)),
            rec(d1 + Duration::hours(2), "happy", Some(0.4)),
            rec(d2, "tired", Some(0.9)),
        ]);
        let trend = agg.daily_trend();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[&d1.date_naive()], vec!["sad".to_string(), "happy".to_string()]);
        assert_eq!(agg.usage_stats(), UsageStats { total_entries: 3, unique_days: 2 });
        assert!((agg.average_confidence() - 0.5).abs() < 1e-9);
        assert_eq!(agg.daily_mood_counts()[&d2.date_naive()]["tired"], 1);
    }

    #[test]
    fn average_ignores_unset_confidence() {
        let agg = TrendAggregator::new(vec![rec(now(), "sad", Some(0.6)), rec(now(), "sad", None)]);
        assert!((agg.average_confidence() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn report_bundles_one_snapshot() {
        let agg = TrendAggregator::new(vec![rec(now() - Duration::days(1), "happy", Some(1.0))]);
        let report = agg.report_at(now());
        assert_eq!(report.dominant_weekly_mood.as_deref(), Some("happy"));
        assert_eq!(report.usage.total_entries, 1);
        assert_eq!(report.generated_at, now());
    }
}
