//! **Agent configuration** loaded from `config/agent.toml` with `SOLACE__*` env overrides.
//!
//! The `[safety]` section is mandatory. Every other section falls back to defaults so a
//! minimal file carrying only the crisis keywords and message is enough to start.

use crate::error::{WellnessError, WellnessResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

/// Crisis keyword list and the message returned when one of them matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    pub crisis_keywords: Vec<String>,
    pub crisis_response_message: String,
}

impl SafetyConfig {
    /// Rejects a keyword set the gate could not run with. An empty or blank entry would
    /// match every message (or none), so both are treated as malformed.
    pub fn validate(&self) -> WellnessResult<()> {
        if self.crisis_keywords.is_empty() {
            return Err(WellnessError::Config(
                "safety.crisis_keywords must list at least one keyword".into(),
            ));
        }
        if let Some(pos) = self.crisis_keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(WellnessError::Config(format!(
                "safety.crisis_keywords[{}] is blank",
                pos
            )));
        }
        if self.crisis_response_message.trim().is_empty() {
            return Err(WellnessError::Config(
                "safety.crisis_response_message must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Flat-file locations, all relative to `data_dir` except `log_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub analytics_file: String,
    pub journal_file: String,
    pub resources_file: String,
    pub activities_file: String,
    pub safety_log_file: String,
    pub cache_dir: String,
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            analytics_file: "emotion_logs.csv".to_string(),
            journal_file: "journal_entries.txt".to_string(),
            resources_file: "resources.json".to_string(),
            activities_file: "activities.json".to_string(),
            safety_log_file: "safety_events.jsonl".to_string(),
            cache_dir: "cache_store".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl StorageConfig {
    /// Re-roots every store under `dir`.
    pub fn rooted_at(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn analytics_path(&self) -> PathBuf {
        self.data_dir.join(&self.analytics_file)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(&self.journal_file)
    }

    pub fn resources_path(&self) -> PathBuf {
        self.data_dir.join(&self.resources_file)
    }

    pub fn activities_path(&self) -> PathBuf {
        self.data_dir.join(&self.activities_file)
    }

    pub fn safety_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.safety_log_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(&self.cache_dir)
    }
}

/// Runtime behaviour of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// `offline` (keyword classifier) or `openrouter`.
    pub llm_mode: String,
    /// Default reply language code (`en` or `hi`).
    pub language: String,
    pub memory_size: usize,
    pub suggestion_count: usize,
    pub cache_enabled: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            llm_mode: "offline".to_string(),
            language: "en".to_string(),
            memory_size: 20,
            suggestion_count: 3,
            cache_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub port: u16,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self { port: 8010 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub safety: SafetyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

impl AgentConfig {
    /// Loads `SOLACE_CONFIG` (or `config/agent.toml`), then overlays `SOLACE__SECTION__KEY`
    /// environment variables. A missing file is a configuration error: the safety gate
    /// has no keywords without it.
    pub fn load() -> WellnessResult<Self> {
        let path = std::env::var("SOLACE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> WellnessResult<Self> {
        if !path.exists() {
            return Err(WellnessError::Config(format!(
                "agent configuration not found at {}",
                path.display()
            )));
        }
        let built = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(config::Environment::with_prefix("SOLACE").separator("__"))
            .build()?;
        Self::finish(built)
    }

    /// Builds from an in-memory TOML document. No environment overlay.
    pub fn from_toml_str(raw: &str) -> WellnessResult<Self> {
        let built = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?;
        Self::finish(built)
    }

    fn finish(built: config::Config) -> WellnessResult<Self> {
        let cfg: AgentConfig = built.try_deserialize()?;
        cfg.safety.validate()?;
        if cfg.agent.memory_size == 0 {
            return Err(WellnessError::Config("agent.memory_size must be at least 1".into()));
        }
        tracing::info!(
            target: "solace::config",
            keywords = cfg.safety.crisis_keywords.len(),
            llm_mode = %cfg.agent.llm_mode,
            data_dir = %cfg.storage.data_dir.display(),
            "Agent configuration loaded"
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[safety]
crisis_keywords = ["suicide", "kill myself"]
crisis_response_message = "Please reach out to someone you trust."
"#;

    #[test]
    fn minimal_file_fills_defaults() {
        let cfg = AgentConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.safety.crisis_keywords.len(), 2);
        assert_eq!(cfg.agent.memory_size, 20);
        assert_eq!(cfg.agent.suggestion_count, 3);
        assert_eq!(cfg.storage.analytics_path(), PathBuf::from("data/emotion_logs.csv"));
    }

    #[test]
    fn missing_safety_section_is_fatal() {
        let err = AgentConfig::from_toml_str("[agent]\nlanguage = \"hi\"\n").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_keyword_list_is_fatal() {
        let raw = "[safety]\ncrisis_keywords = []\ncrisis_response_message = \"x\"\n";
        assert!(AgentConfig::from_toml_str(raw).unwrap_err().is_fatal());
    }

    #[test]
    fn blank_keyword_or_message_is_fatal() {
        let raw = "[safety]\ncrisis_keywords = [\"suicide\", \"  \"]\ncrisis_response_message = \"x\"\n";
        assert!(AgentConfig::from_toml_str(raw).is_err());
        let raw = "[safety]\ncrisis_keywords = [\"suicide\"]\ncrisis_response_message = \" \"\n";
        assert!(AgentConfig::from_toml_str(raw).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgentConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, WellnessError::Config(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, format!("{}\n[gateway]\nport = 9100\n", MINIMAL)).unwrap();
        let cfg = AgentConfig::load_from(&path).unwrap();
        assert_eq!(cfg.gateway.port, 9100);
    }
}
