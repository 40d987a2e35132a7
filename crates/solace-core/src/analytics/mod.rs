//! Mood analytics: the append-only log and the trend queries built on it.

mod csv;
mod store;
mod trends;

pub use store::{AnalyticsStore, ANALYTICS_HEADER};
pub use trends::{dominant, TrendAggregator, TrendReport, UsageStats, WEEK_WINDOW_DAYS};
