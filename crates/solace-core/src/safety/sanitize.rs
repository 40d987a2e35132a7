//! Ordered find/replace rules for outgoing text.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Marker left where an unsafe phrase was removed.
pub const REDACTION_MARKER: &str = "[removed unsafe content]";

/// Phrases that must never reach the user, in the order they are applied.
const UNSAFE_PHRASES: &[&str] = &["kill yourself", "you should hurt", "stop living", "suicide"];

#[derive(Debug, Clone)]
pub struct SanitizeRule {
    pattern: Regex,
    replacement: String,
}

impl SanitizeRule {
    /// Case-insensitive literal phrase rule.
    pub fn phrase(phrase: &str, replacement: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&regex::escape(phrase))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    /// Rule from a caller-supplied regex.
    pub fn regex(pattern: Regex, replacement: &str) -> Self {
        Self {
            pattern,
            replacement: replacement.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

static DEFAULT_RULES: Lazy<Vec<SanitizeRule>> = Lazy::new(|| {
    UNSAFE_PHRASES
        .iter()
        .filter_map(|p| SanitizeRule::phrase(p, REDACTION_MARKER).ok())
        .collect()
});

/// Applies its rules one after another; each rule sees the output of the previous one.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Vec<SanitizeRule>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl Sanitizer {
    pub fn with_rules(rules: Vec<SanitizeRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SanitizeRule] {
        &self.rules
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if rule.pattern.is_match(&out) {
                out = rule
                    .pattern
                    .replace_all(&out, regex::NoExpand(&rule.replacement))
                    .into_owned();
            }
        }
        out
    }
}
