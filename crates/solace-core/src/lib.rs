//! solace-core: the wellness companion's core library.
//!
//! Safety gate, mood dispatch catalogs, the append-only analytics log with its trend
//! queries, the journal, conversation memory and the pipeline that strings them together.
//! The mood classifier and translator are collaborators behind [`MoodClassifier`] and
//! [`Translate`]; concrete ones live in `solace-skills`.

mod cache;
mod config;
mod error;
mod journal;
mod memory;
mod pipeline;
mod shared;
mod storage;
mod traits;

pub mod analytics;
pub mod catalog;
pub mod safety;
pub mod validators;

pub use cache::{cache_key, CachedAssessment, ClassificationCache};
pub use self::config::{AgentConfig, AgentSettings, GatewaySettings, SafetyConfig, StorageConfig};
pub use error::{WellnessError, WellnessResult};
pub use journal::{JournalReceipt, JournalStore, DEFAULT_RECENT_LIMIT};
pub use memory::{ConversationMemory, Role, Turn, DEFAULT_MEMORY_SIZE};
pub use pipeline::{compose_reply, JournalOutcome, PipelineOutcome, Session, WellnessPipeline, WellnessResponse};
pub use shared::{
    normalize_mood_label, Language, Mood, MoodAssessment, MoodRecord, ResourceLink, SeverityAssessment,
};
pub use traits::{MoodClassifier, Translate};

pub use analytics::{AnalyticsStore, TrendAggregator, TrendReport, UsageStats};
pub use catalog::{CopingCatalog, ResourceCatalog};
pub use safety::{SafetyGate, SafetyVerdict};
