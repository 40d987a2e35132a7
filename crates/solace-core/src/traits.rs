//! Collaborator seams: the mood classifier and the reply translator.
//!
//! Both live outside the core. The pipeline only sees these traits, so tests and the
//! offline mode can swap in deterministic implementations.

use crate::error::WellnessResult;
use crate::shared::{Language, MoodAssessment};

/// Turns a message into a mood label, confidence and short reason. May be slow and may fail.
#[async_trait::async_trait]
pub trait MoodClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> WellnessResult<MoodAssessment>;

    fn name(&self) -> &str;
}

/// Pure text substitution into `target`. Words it does not know are left as they are.
pub trait Translate: Send + Sync {
    fn translate(&self, text: &str, target: Language) -> String;
}
