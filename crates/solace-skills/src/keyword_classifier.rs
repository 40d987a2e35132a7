//! Offline mood classifier: whole-word keyword families, no network.
//!
//! Used when no LLM key is configured and as the fallback in tests. The family with the
//! most hits wins; ties go to the family listed first.

use once_cell::sync::Lazy;
use regex::Regex;
use solace_core::{Mood, MoodAssessment, MoodClassifier, WellnessResult};

const FAMILIES: &[(Mood, &[&str])] = &[
    (Mood::Stressed, &["exam", "exams", "deadline", "deadlines", "pressure", "stress", "stressed", "workload", "assignment"]),
    (Mood::Anxious, &["panic", "anxious", "anxiety", "worried", "worry", "nervous", "scared", "can't sleep", "cant sleep"]),
    (Mood::Sad, &["sad", "alone", "lonely", "depressed", "low", "cry", "crying", "down", "empty"]),
    (Mood::Angry, &["angry", "furious", "annoyed", "frustrated", "hate", "irritated", "mad"]),
    (Mood::Overwhelmed, &["overwhelmed", "too much", "can't cope", "drowning", "swamped"]),
    (Mood::Tired, &["tired", "exhausted", "drained", "sleepy", "burnt out", "burned out"]),
    (Mood::Happy, &["happy", "great", "excited", "grateful", "glad", "good", "proud"]),
];

const BASE_CONFIDENCE: f64 = 0.5;
const PER_HIT: f64 = 0.15;
const MAX_CONFIDENCE: f64 = 0.95;

struct Family {
    mood: Mood,
    pattern: Regex,
}

static COMPILED: Lazy<Vec<Family>> = Lazy::new(|| {
    FAMILIES
        .iter()
        .filter_map(|(mood, words)| {
            let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
                .ok()
                .map(|pattern| Family { mood: *mood, pattern })
        })
        .collect()
});

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`MoodClassifier::classify`].
    pub fn assess(&self, message: &str) -> MoodAssessment {
        let mut best: Option<(Mood, Vec<String>)> = None;
        for family in COMPILED.iter() {
            let hits: Vec<String> = family
                .pattern
                .find_iter(message)
                .map(|m| m.as_str().to_lowercase())
                .collect();
            if hits.is_empty() {
                continue;
            }
            if best.as_ref().map_or(true, |(_, b)| hits.len() > b.len()) {
                best = Some((family.mood, hits));
            }
        }
        match best {
            Some((mood, hits)) => MoodAssessment {
                mood: mood.as_str().to_string(),
                confidence: (BASE_CONFIDENCE + PER_HIT * hits.len() as f64).min(MAX_CONFIDENCE),
                reason: format!("matched: {}", hits.join(", ")),
            },
            None => MoodAssessment {
                mood: Mood::Neutral.as_str().to_string(),
                confidence: BASE_CONFIDENCE,
                reason: "no emotional keywords detected".to_string(),
            },
        }
    }
}

#[async_trait::async_trait]
impl MoodClassifier for KeywordClassifier {
    async fn classify(&self, message: &str) -> WellnessResult<MoodAssessment> {
        Ok(self.assess(message))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
