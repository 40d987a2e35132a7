//! **AnalyticsStore**: append-only mood log in `emotion_logs.csv`.

use super::csv::{encode_record, parse_records};
use crate::error::WellnessResult;
use crate::shared::MoodRecord;
use crate::storage::AppendFile;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

pub const ANALYTICS_HEADER: &str = "timestamp,mood,confidence,user_message";

#[derive(Debug)]
pub struct AnalyticsStore {
    file: AppendFile,
}

impl AnalyticsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AppendFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Logs one record stamped with the current UTC time.
    pub fn append(&self, mood: &str, confidence: Option<f64>, message: &str) -> WellnessResult<MoodRecord> {
        let record = MoodRecord::now(mood, confidence, message);
        self.append_record(&record)?;
        Ok(record)
    }

    /// Logs a fully formed record (imports, backfills, tests).
    pub fn append_record(&self, record: &MoodRecord) -> WellnessResult<()> {
        let ts = record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let confidence = record.confidence.map(|c| c.to_string()).unwrap_or_default();
        let line = encode_record(&[&ts, &record.mood, &confidence, &record.message]);
        let header = format!("{}\n", ANALYTICS_HEADER);
        self.file.append(Some(&header), &line)?;
        tracing::debug!(
            target: "solace::analytics",
            mood = %record.mood,
            chars = record.message.chars().count(),
            "Mood record appended"
        );
        Ok(())
    }

    /// Every complete record in append order; empty when nothing has been logged yet.
    pub fn load_all(&self) -> WellnessResult<Vec<MoodRecord>> {
        let Some(raw) = self.file.read_to_string()? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for (idx, fields) in parse_records(&raw).into_iter().enumerate() {
            if idx == 0 && fields.first().map(String::as_str) == Some("timestamp") {
                continue;
            }
            match decode(&fields) {
                Some(r) => out.push(r),
                None => tracing::warn!(
                    target: "solace::analytics",
                    row = idx,
                    path = %self.path().display(),
                    "Skipping malformed analytics row"
                ),
            }
        }
        Ok(out)
    }

    /// Records at or after `cutoff`.
    pub fn load_since(&self, cutoff: DateTime<Utc>) -> WellnessResult<Vec<MoodRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.timestamp >= cutoff)
            .collect())
    }
}

fn decode(fields: &[String]) -> Option<MoodRecord> {
    let [ts, mood, confidence, message] = fields else {
        return None;
    };
    let timestamp = parse_timestamp(ts)?;
    let confidence = match confidence.trim() {
        "" => None,
        c => Some(c.parse::<f64>().ok()?),
    };
    Some(MoodRecord {
        timestamp,
        mood: mood.clone(),
        confidence,
        message: message.clone(),
    })
}

/// RFC 3339, or a bare ISO-8601 local time taken as UTC (older logs carry no offset).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|n| n.and_utc())
}
