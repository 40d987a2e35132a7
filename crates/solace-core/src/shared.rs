//! Shared types: mood vocabulary, analytics records, classifier output and reply language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Canonical mood vocabulary. Every label is folded onto one of these before catalog
/// lookups; labels outside the vocabulary pass through lowercased and hit the fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Stressed,
    Anxious,
    Angry,
    Neutral,
    Tired,
    Overwhelmed,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Stressed,
        Mood::Anxious,
        Mood::Angry,
        Mood::Neutral,
        Mood::Tired,
        Mood::Overwhelmed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Stressed => "stressed",
            Mood::Anxious => "anxious",
            Mood::Angry => "angry",
            Mood::Neutral => "neutral",
            Mood::Tired => "tired",
            Mood::Overwhelmed => "overwhelmed",
        }
    }

    /// Parses a label case-insensitively, accepting the legacy noun spellings
    /// (`stress`, `anxiety`, ...) used by older resource files.
    pub fn parse(label: &str) -> Option<Mood> {
        let key = label.trim().to_lowercase();
        let mood = match key.as_str() {
            "happy" | "happiness" => Mood::Happy,
            "sad" | "sadness" => Mood::Sad,
            "stressed" | "stress" => Mood::Stressed,
            "anxious" | "anxiety" => Mood::Anxious,
            "angry" | "anger" => Mood::Angry,
            "neutral" => Mood::Neutral,
            "tired" => Mood::Tired,
            "overwhelmed" | "overwhelm" => Mood::Overwhelmed,
            _ => return None,
        };
        Some(mood)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim + lowercase + alias folding. Unknown labels keep their lowercased form.
pub fn normalize_mood_label(label: &str) -> String {
    match Mood::parse(label) {
        Some(m) => m.as_str().to_string(),
        None => label.trim().to_lowercase(),
    }
}

/// One row of the analytics log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub timestamp: DateTime<Utc>,
    pub mood: String,
    pub confidence: Option<f64>,
    pub message: String,
}

impl MoodRecord {
    pub fn now(mood: impl Into<String>, confidence: Option<f64>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            mood: mood.into(),
            confidence,
            message: message.into(),
        }
    }
}

/// Per-message safety reading. Never persisted with the message text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    pub flagged: bool,
    pub matched_keywords: BTreeSet<String>,
    /// 0..=10, the heaviest matched distress signal.
    pub score: u8,
}

/// What the mood classifier collaborator returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAssessment {
    pub mood: String,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub title: String,
    pub link: String,
}

impl ResourceLink {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
        }
    }
}

/// Reply language. English is the default and never goes through the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "hi" | "hindi" => Some(Language::Hindi),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }
}
