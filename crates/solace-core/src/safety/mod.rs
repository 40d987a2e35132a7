//! **SafetyGate**: crisis keyword detection, severity scoring and reply sanitising.
//!
//! The gate runs before anything else touches a message. Crisis matching is a plain
//! lowercase substring test, so a keyword also matches inside longer words ("suicid"
//! catches both "suicide" and "suicidal"); false positives are cheaper here than misses.

mod audit;
mod sanitize;

pub use audit::{SafetyAuditLog, SafetyEvent};
pub use sanitize::{SanitizeRule, Sanitizer, REDACTION_MARKER};

use crate::config::SafetyConfig;
use crate::error::WellnessResult;
use crate::shared::SeverityAssessment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Distress words and their weight. The score of a message is the heaviest match.
pub const SEVERITY_WEIGHTS: &[(&str, u8)] = &[
    ("hopeless", 8),
    ("worthless", 7),
    ("broken", 6),
    ("anxious", 5),
    ("stressed", 4),
    ("sad", 3),
    ("tired", 2),
];

pub const MAX_SEVERITY: u8 = 10;

/// Result of [`SafetyGate::check`]. `message` is empty unless flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub flagged: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SafetyGate {
    crisis_keywords: Vec<String>,
    crisis_message: String,
    sanitizer: Sanitizer,
}

impl SafetyGate {
    /// Fails with a configuration error if the keyword list or message is unusable.
    pub fn new(config: &SafetyConfig) -> WellnessResult<Self> {
        Self::with_sanitizer(config, Sanitizer::default())
    }

    pub fn with_sanitizer(config: &SafetyConfig, sanitizer: Sanitizer) -> WellnessResult<Self> {
        config.validate()?;
        let crisis_keywords: Vec<String> = config
            .crisis_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .collect();
        tracing::info!(
            target: "solace::safety",
            keywords = crisis_keywords.len(),
            rules = sanitizer.rules().len(),
            "Safety gate armed"
        );
        Ok(Self {
            crisis_keywords,
            crisis_message: config.crisis_response_message.clone(),
            sanitizer,
        })
    }

    pub fn crisis_message(&self) -> &str {
        &self.crisis_message
    }

    pub fn detect_crisis(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.crisis_keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn matched_crisis_keywords(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        self.crisis_keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect()
    }

    /// Maximum weight among matched distress words, 0 when none match.
    pub fn severity_score(&self, text: &str) -> u8 {
        let lowered = text.to_lowercase();
        SEVERITY_WEIGHTS
            .iter()
            .filter(|(word, _)| lowered.contains(word))
            .map(|(_, weight)| *weight)
            .max()
            .unwrap_or(0)
            .min(MAX_SEVERITY)
    }

    /// Full reading for audit purposes. A crisis match pins the score at the maximum.
    pub fn assess(&self, text: &str) -> SeverityAssessment {
        let matched_keywords = self.matched_crisis_keywords(text);
        let flagged = !matched_keywords.is_empty();
        let score = if flagged {
            MAX_SEVERITY
        } else {
            self.severity_score(text)
        };
        SeverityAssessment {
            flagged,
            matched_keywords,
            score,
        }
    }

    pub fn sanitize(&self, text: &str) -> String {
        self.sanitizer.apply(text)
    }

    /// Last pass over anything generated before it is shown to the user.
    pub fn ensure_safe_response(&self, text: &str) -> String {
        self.sanitize(text)
    }

    pub fn check(&self, text: &str) -> SafetyVerdict {
        if self.detect_crisis(text) {
            tracing::warn!(target: "solace::safety", "Crisis keywords detected; short-circuiting");
            SafetyVerdict {
                flagged: true,
                message: self.crisis_message.clone(),
            }
        } else {
            SafetyVerdict {
                flagged: false,
                message: String::new(),
            }
        }
    }
}
