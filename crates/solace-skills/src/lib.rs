//! solace-skills: concrete collaborators for the wellness pipeline.
//!
//! - [`KeywordClassifier`]: offline mood classifier.
//! - [`OpenRouterClassifier`]: LLM mood classifier over OpenRouter.
//! - [`DictionaryTranslator`]: English/Hindi reply translation.

mod keyword_classifier;
mod openrouter_classifier;
mod translator;

pub use keyword_classifier::KeywordClassifier;
pub use openrouter_classifier::{parse_classifier_reply, OpenRouterClassifier};
pub use translator::DictionaryTranslator;

use solace_core::MoodClassifier;
use std::sync::Arc;

/// Picks the classifier for `llm_mode`. `openrouter` without an API key falls back to
/// the keyword classifier with a warning.
pub fn create_classifier(llm_mode: &str) -> Arc<dyn MoodClassifier> {
    match llm_mode.trim().to_lowercase().as_str() {
        "openrouter" | "llm" => match OpenRouterClassifier::from_env() {
            Some(c) => {
                tracing::info!(target: "solace::classifier", model = c.model(), "Using OpenRouter mood classifier");
                Arc::new(c)
            }
            None => {
                tracing::warn!(
                    target: "solace::classifier",
                    "llm_mode=openrouter but OPENROUTER_API_KEY is not set; using keyword classifier"
                );
                Arc::new(KeywordClassifier::new())
            }
        },
        "offline" | "keyword" | "mock" => Arc::new(KeywordClassifier::new()),
        other => {
            tracing::warn!(target: "solace::classifier", llm_mode = other, "Unknown llm_mode; using keyword classifier");
            Arc::new(KeywordClassifier::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_mode_is_keyword() {
        assert_eq!(create_classifier("offline").name(), "keyword");
        assert_eq!(create_classifier("something-else").name(), "keyword");
    }
}
