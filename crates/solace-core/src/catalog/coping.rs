//! **CopingCatalog**: mood label to a small sample of coping activities.
//!
//! Catalog order is kept; when a mood has more activities than requested, a uniform
//! sample without replacement is drawn from a seedable RNG.

use crate::error::{WellnessError, WellnessResult};
use crate::shared::normalize_mood_label;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

/// Returned for moods the catalog does not know, in this order.
pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Try a short breathing exercise (inhale 4s, hold 2s, exhale 6s).",
    "Drink some water and stretch your body for 30 seconds.",
    "Write down what you're feeling in a small journal entry.",
];

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "happy",
        &[
            "Write down three things that went well today so you can come back to them.",
            "Share the good news with a friend or family member.",
            "Use the energy for a task you have been putting off.",
            "Take a photo of something that made you smile today.",
        ],
    ),
    (
        "sad",
        &[
            "Step outside for ten minutes of daylight and a slow walk.",
            "Message someone you trust and tell them how your day is going.",
            "Put on a playlist that has lifted your mood before.",
            "Write a short note to yourself the way you would to a friend.",
            "Do one small, kind thing for yourself: a warm drink, a shower, clean sheets.",
        ],
    ),
    (
        "stressed",
        &[
            "Break your next task into three tiny steps and do only the first one.",
            "Work in a 25-minute focus block, then take a real 5-minute break.",
            "Write down everything on your mind, then circle the one thing due soonest.",
            "Roll your shoulders and unclench your jaw for one minute.",
            "Try box breathing: inhale 4s, hold 4s, exhale 4s, hold 4s.",
        ],
    ),
    (
        "anxious",
        &[
            "Try the 5-4-3-2-1 grounding exercise: name 5 things you see, 4 you can touch, 3 you hear, 2 you smell, 1 you taste.",
            "Breathe out for longer than you breathe in, for ten slow breaths.",
            "Write the worry down and next to it the next small thing you can actually control.",
            "Hold something cold or splash water on your face to reset your body.",
            "Go for a short brisk walk and count your steps.",
        ],
    ),
    (
        "angry",
        &[
            "Pause before replying to anyone and count slowly to ten.",
            "Do a quick burst of movement: stairs, push-ups or a fast walk.",
            "Write out exactly what made you angry, then tear it up or delete it.",
            "Try progressive muscle relaxation, tensing and releasing each muscle group.",
        ],
    ),
    (
        "neutral",
        &[
            "Check in with yourself: how did you sleep, eat and move today?",
            "Plan one small thing to look forward to this week.",
            "Spend five minutes tidying the space you study in.",
        ],
    ),
    (
        "tired",
        &[
            "Take a 20-minute rest with your phone out of reach.",
            "Drink a glass of water and eat something with protein.",
            "Set a fixed bedtime tonight and stop screens 30 minutes before it.",
            "Get a few minutes of fresh air or daylight.",
        ],
    ),
    (
        "overwhelmed",
        &[
            "List everything on your plate, then pick only one item for the next hour.",
            "Ask someone for help with one task today.",
            "Close every tab and app you are not using right now.",
            "Take five slow breaths before deciding what to do next.",
        ],
    ),
];

#[derive(Debug)]
pub struct CopingCatalog {
    entries: BTreeMap<String, Vec<String>>,
    rng: Mutex<StdRng>,
}

impl CopingCatalog {
    /// Built-in catalog sampled from OS entropy.
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries(), StdRng::from_entropy())
    }

    /// Built-in catalog with a pinned sampler, for reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_entries(builtin_entries(), StdRng::seed_from_u64(seed))
    }

    pub fn from_map(entries: BTreeMap<String, Vec<String>>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::from_entries(entries, rng)
    }

    /// Loads `activities.json` (mood -> list of strings) when present; otherwise the
    /// built-in catalog. A present but unreadable file is an error.
    pub fn load_or_builtin(path: &Path) -> WellnessResult<Self> {
        if !path.exists() {
            tracing::info!(target: "solace::catalog", path = %path.display(), "No activities file; using built-in coping catalog");
            return Ok(Self::builtin());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| WellnessError::store(path, e))?;
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)
            .map_err(|e| WellnessError::corrupt(path, e.to_string()))?;
        tracing::info!(target: "solace::catalog", moods = parsed.len(), "Coping catalog loaded");
        Ok(Self::from_entries(parsed, StdRng::from_entropy()))
    }

    fn from_entries(raw: BTreeMap<String, Vec<String>>, rng: StdRng) -> Self {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (mood, items) in raw {
            entries.entry(normalize_mood_label(&mood)).or_default().extend(items);
        }
        Self {
            entries,
            rng: Mutex::new(rng),
        }
    }

    pub fn moods(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries_for(&self, mood: &str) -> Option<&[String]> {
        self.entries.get(&normalize_mood_label(mood)).map(Vec::as_slice)
    }

    /// Suggestions from the catalog's own sampler.
    pub fn suggest(&self, mood: &str, count: usize) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.suggest_with(mood, count, &mut *rng)
    }

    /// Suggestions drawn with a caller-provided RNG.
    ///
    /// Unknown mood: the fixed fallback (first `count` of it). Known mood with at most
    /// `count` activities: all of them, in order. Otherwise `count` distinct activities.
    pub fn suggest_with<R: Rng + ?Sized>(&self, mood: &str, count: usize, rng: &mut R) -> Vec<String> {
        let Some(items) = self.entries_for(mood) else {
            return FALLBACK_SUGGESTIONS
                .iter()
                .take(count)
                .map(|s| s.to_string())
                .collect();
        };
        if items.len() <= count {
            return items.to_vec();
        }
        items.choose_multiple(rng, count).cloned().collect()
    }
}

fn builtin_entries() -> BTreeMap<String, Vec<String>> {
    BUILTIN
        .iter()
        .map(|(mood, items)| (mood.to_string(), items.iter().map(|s| s.to_string()).collect()))
        .collect()
}
