//! **WellnessPipeline**: one request/response cycle.
//!
//! safety gate -> input validation -> mood classification -> coping + resources ->
//! analytics append -> reply sanitising -> optional translation -> session memory.
//! Non-English sessions are translated to English before classification.
//!
//! A crisis match returns before anything that could fail, and nothing about the
//! message except the matched keywords is written anywhere.

use crate::analytics::{AnalyticsStore, TrendAggregator, TrendReport};
use crate::cache::ClassificationCache;
use crate::catalog::{CopingCatalog, ResourceCatalog};
use crate::config::{AgentConfig, AgentSettings};
use crate::error::WellnessResult;
use crate::journal::{JournalReceipt, JournalStore};
use crate::memory::{ConversationMemory, Role};
use crate::safety::{SafetyAuditLog, SafetyGate};
use crate::shared::{normalize_mood_label, Language, MoodAssessment, ResourceLink};
use crate::traits::{MoodClassifier, Translate};
use crate::validators::validate_user_input;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const EMPTY_INPUT_PROMPT: &str =
    "I'm here whenever you're ready. Could you tell me a little about how you're feeling?";
const LONG_INPUT_PROMPT: &str =
    "That's a lot to hold at once. Could you share it in a shorter message (up to 2000 characters)?";
const FALLBACK_MOOD: &str = "neutral";

/// One conversation: its memory and reply language. Never shared between users.
#[derive(Debug, Clone)]
pub struct Session {
    pub memory: ConversationMemory,
    pub language: Language,
}

impl Session {
    pub fn new(memory_size: usize, language: Language) -> Self {
        Self {
            memory: ConversationMemory::with_capacity(memory_size),
            language,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(crate::memory::DEFAULT_MEMORY_SIZE, Language::English)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessResponse {
    pub reply: String,
    pub mood: String,
    pub confidence: Option<f64>,
    pub reason: String,
    pub severity: u8,
    pub suggestions: Vec<String>,
    pub resources: Vec<ResourceLink>,
    pub language: Language,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Crisis keywords matched; `message` is the configured crisis response.
    Crisis { message: String, severity: u8 },
    /// Input failed validation; `message` is a prompt to try again.
    Rejected { reason: String, message: String },
    Supported(WellnessResponse),
}

impl PipelineOutcome {
    /// Text to show the user, whichever branch was taken.
    pub fn reply(&self) -> &str {
        match self {
            PipelineOutcome::Crisis { message, .. } => message,
            PipelineOutcome::Rejected { message, .. } => message,
            PipelineOutcome::Supported(r) => &r.reply,
        }
    }

    pub fn is_crisis(&self) -> bool {
        matches!(self, PipelineOutcome::Crisis { .. })
    }
}

/// Result of saving a journal entry through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalOutcome {
    pub receipt: Option<JournalReceipt>,
    pub crisis_message: Option<String>,
}

struct Classified {
    mood: String,
    confidence: Option<f64>,
    reason: String,
    from_cache: bool,
}

/// Process-wide services, built once at start-up and shared by handle.
pub struct WellnessPipeline {
    gate: SafetyGate,
    audit: SafetyAuditLog,
    classifier: Arc<dyn MoodClassifier>,
    translator: Option<Arc<dyn Translate>>,
    coping: CopingCatalog,
    resources: ResourceCatalog,
    analytics: AnalyticsStore,
    journal: JournalStore,
    cache: Option<ClassificationCache>,
    settings: AgentSettings,
}

impl WellnessPipeline {
    pub fn from_config(config: &AgentConfig, classifier: Arc<dyn MoodClassifier>) -> WellnessResult<Self> {
        let gate = SafetyGate::new(&config.safety)?;
        let storage = &config.storage;
        let coping = CopingCatalog::load_or_builtin(&storage.activities_path())?;
        let cache = if config.agent.cache_enabled {
            Some(ClassificationCache::open_path(storage.cache_path())?)
        } else {
            None
        };
        tracing::info!(
            target: "solace::pipeline",
            classifier = classifier.name(),
            cache = cache.is_some(),
            data_dir = %storage.data_dir.display(),
            "Wellness pipeline ready"
        );
        Ok(Self {
            gate,
            audit: SafetyAuditLog::new(storage.safety_log_path()),
            classifier,
            translator: None,
            coping,
            resources: ResourceCatalog::new(storage.resources_path()),
            analytics: AnalyticsStore::new(storage.analytics_path()),
            journal: JournalStore::new(storage.journal_path()),
            cache,
            settings: config.agent.clone(),
        })
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translate>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replaces the coping catalog (seeded catalogs in tests).
    pub fn with_coping_catalog(mut self, coping: CopingCatalog) -> Self {
        self.coping = coping;
        self
    }

    pub fn new_session(&self) -> Session {
        let language = Language::from_code(&self.settings.language).unwrap_or_default();
        Session::new(self.settings.memory_size, language)
    }

    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    pub fn analytics(&self) -> &AnalyticsStore {
        &self.analytics
    }

    pub fn safety_log(&self) -> &SafetyAuditLog {
        &self.audit
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub async fn process(&self, session: &mut Session, text: &str) -> WellnessResult<PipelineOutcome> {
        let verdict = self.gate.check(text);
        if verdict.flagged {
            let assessment = self.gate.assess(text);
            if let Err(e) = self.audit.record(&assessment) {
                tracing::error!(target: "solace::pipeline", error = %e, "Failed to record safety event");
            }
            return Ok(PipelineOutcome::Crisis {
                message: verdict.message,
                severity: assessment.score,
            });
        }

        if let Err(e) = validate_user_input(text) {
            let message = if text.trim().is_empty() {
                EMPTY_INPUT_PROMPT
            } else {
                LONG_INPUT_PROMPT
            };
            return Ok(PipelineOutcome::Rejected {
                reason: e.to_string(),
                message: message.to_string(),
            });
        }

        let severity = self.gate.severity_score(text);
        let classified = match (session.language, &self.translator) {
            (Language::English, _) | (_, None) => self.classify(text).await,
            (_, Some(t)) => self.classify(&t.translate(text, Language::English)).await,
        };
        let mood = classified.mood;
        let suggestions = self.coping.suggest(&mood, self.settings.suggestion_count);
        let resources = self.resources.recommend(&mood)?;
        self.append_with_retry(&mood, classified.confidence, text)?;

        let reply = self
            .gate
            .ensure_safe_response(&compose_reply(&mood, &suggestions, &resources));
        let reply = self.localize(&reply, session.language);

        session.memory.add(Role::User, text);
        session.memory.add(Role::Assistant, reply.clone());
        tracing::info!(
            target: "solace::pipeline",
            mood = %mood,
            severity,
            cached = classified.from_cache,
            "Message processed"
        );

        Ok(PipelineOutcome::Supported(WellnessResponse {
            reply,
            mood,
            confidence: classified.confidence,
            reason: classified.reason,
            severity,
            suggestions,
            resources,
            language: session.language,
            from_cache: classified.from_cache,
        }))
    }

    async fn classify(&self, text: &str) -> Classified {
        if let Some(cache) = &self.cache {
            match cache.get(text) {
                Ok(Some(hit)) => return classified_from(hit.assessment, true),
                Ok(None) => {}
                Err(e) => tracing::warn!(target: "solace::cache", error = %e, "Cache read failed"),
            }
        }
        match self.classifier.classify(text).await {
            Ok(assessment) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.insert(text, &assessment) {
                        tracing::warn!(target: "solace::cache", error = %e, "Cache write failed");
                    }
                }
                classified_from(assessment, false)
            }
            Err(e) => {
                tracing::warn!(
                    target: "solace::pipeline",
                    classifier = self.classifier.name(),
                    error = %e,
                    "Mood classification failed; continuing as neutral"
                );
                Classified {
                    mood: FALLBACK_MOOD.to_string(),
                    confidence: None,
                    reason: "classifier unavailable".to_string(),
                    from_cache: false,
                }
            }
        }
    }

    fn append_with_retry(&self, mood: &str, confidence: Option<f64>, text: &str) -> WellnessResult<()> {
        match self.analytics.append(mood, confidence, text) {
            Ok(_) => Ok(()),
            Err(e) if e.is_retryable() => {
                tracing::warn!(target: "solace::analytics", error = %e, "Analytics append failed; retrying once");
                self.analytics.append(mood, confidence, text).map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    fn localize(&self, text: &str, language: Language) -> String {
        match (language, &self.translator) {
            (Language::English, _) | (_, None) => text.to_string(),
            (lang, Some(t)) => t.translate(text, lang),
        }
    }

    pub fn suggest_coping(&self, mood: &str, count: usize) -> Vec<String> {
        self.coping.suggest(mood, count)
    }

    pub fn recommend_resources(&self, mood: &str) -> WellnessResult<Vec<ResourceLink>> {
        self.resources.recommend(mood)
    }

    pub fn trends(&self) -> WellnessResult<TrendReport> {
        Ok(TrendAggregator::from_store(&self.analytics)?.report())
    }

    /// Journal text goes through the safety gate before anything is written. A crisis
    /// entry is audited first and its crisis message is returned even when the save
    /// itself fails (`receipt` is then `None`). Non-crisis save errors propagate.
    pub fn save_journal_entry(&self, text: &str) -> WellnessResult<JournalOutcome> {
        let verdict = self.gate.check(text);
        if !verdict.flagged {
            let receipt = self.journal.save_entry(text)?;
            return Ok(JournalOutcome {
                receipt: Some(receipt),
                crisis_message: None,
            });
        }

        if let Err(e) = self.audit.record(&self.gate.assess(text)) {
            tracing::error!(target: "solace::pipeline", error = %e, "Failed to record safety event");
        }
        let receipt = match self.journal.save_entry(text) {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::error!(target: "solace::journal", error = %e, "Crisis journal entry not saved");
                None
            }
        };
        Ok(JournalOutcome {
            receipt,
            crisis_message: Some(verdict.message),
        })
    }

    pub fn recent_journal_entries(&self, limit: usize) -> WellnessResult<Vec<String>> {
        self.journal.read_recent(limit)
    }

    pub fn clear_cache(&self) -> WellnessResult<()> {
        match &self.cache {
            Some(c) => c.clear(),
            None => Ok(()),
        }
    }
}

fn classified_from(assessment: MoodAssessment, from_cache: bool) -> Classified {
    let confidence = if assessment.confidence.is_finite() {
        Some(assessment.confidence.clamp(0.0, 1.0))
    } else {
        None
    };
    Classified {
        mood: normalize_mood_label(&assessment.mood),
        confidence,
        reason: assessment.reason,
        from_cache,
    }
}

pub fn compose_reply(mood: &str, suggestions: &[String], resources: &[ResourceLink]) -> String {
    let mut out = format!("You're feeling **{}**.\n\nHere are some helpful strategies:\n", mood);
    for s in suggestions {
        out.push_str("• ");
        out.push_str(s);
        out.push('\n');
    }
    if !resources.is_empty() {
        out.push_str("\nHelpful resources:\n");
        for r in resources {
            out.push_str(&format!("• {}: {}\n", r.title, r.link));
        }
    }
    out.trim_end().to_string()
}
