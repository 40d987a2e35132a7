//! Append-only JSONL record of crisis short-circuits. Message text is never stored.

use crate::error::WellnessResult;
use crate::shared::SeverityAssessment;
use crate::storage::AppendFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyEvent {
    pub timestamp: DateTime<Utc>,
    pub severity: u8,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug)]
pub struct SafetyAuditLog {
    file: AppendFile,
}

impl SafetyAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AppendFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn record(&self, assessment: &SeverityAssessment) -> WellnessResult<SafetyEvent> {
        let event = SafetyEvent {
            timestamp: Utc::now(),
            severity: assessment.score,
            matched_keywords: assessment.matched_keywords.iter().cloned().collect(),
        };
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        self.file.append(None, &line)?;
        Ok(event)
    }

    /// Complete lines only; a torn trailing line is skipped.
    pub fn load_all(&self) -> WellnessResult<Vec<SafetyEvent>> {
        let Some(raw) = self.file.read_to_string()? else {
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        for line in raw.split_inclusive('\n') {
            if !line.ends_with('\n') || line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SafetyEvent>(line.trim_end()) {
                Ok(e) => events.push(e),
                Err(e) => tracing::warn!(target: "solace::safety", error = %e, "Skipping unreadable safety event"),
            }
        }
        Ok(events)
    }
}
