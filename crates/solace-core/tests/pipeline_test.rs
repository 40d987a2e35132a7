//! End-to-end pipeline behaviour against on-disk stores in a temp directory.

use solace_core::{
    AgentConfig, CopingCatalog, Language, MoodAssessment, MoodClassifier, PipelineOutcome, StorageConfig,
    Translate, WellnessError, WellnessPipeline, WellnessResult,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CRISIS_MESSAGE: &str = "You matter. Please contact a crisis line or someone you trust right now.";

struct CountingClassifier {
    calls: AtomicUsize,
    mood: &'static str,
    fail: bool,
}

impl CountingClassifier {
    fn new(mood: &'static str) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), mood, fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), mood: "", fail: true })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MoodClassifier for CountingClassifier {
    async fn classify(&self, _message: &str) -> WellnessResult<MoodAssessment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(WellnessError::Classifier("upstream timed out".into()));
        }
        Ok(MoodAssessment {
            mood: self.mood.to_string(),
            confidence: 0.75,
            reason: "test".into(),
        })
    }

    fn name(&self) -> &str {
        "counting"
    }
}

struct Shouty;

impl Translate for Shouty {
    fn translate(&self, text: &str, _target: Language) -> String {
        text.to_uppercase()
    }
}

fn config(dir: &Path, cache_enabled: bool) -> AgentConfig {
    let mut cfg = AgentConfig::from_toml_str(&format!(
        "[safety]\ncrisis_keywords = [\"suicide\", \"kill myself\", \"end my life\"]\ncrisis_response_message = \"{}\"\n",
        CRISIS_MESSAGE
    ))
    .unwrap();
    cfg.storage = StorageConfig::rooted_at(dir);
    cfg.agent.cache_enabled = cache_enabled;
    cfg
}

#[tokio::test]
async fn crisis_short_circuits_before_classification() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = CountingClassifier::new("sad");
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), classifier.clone()).unwrap();
    let mut session = pipeline.new_session();

    for text in ["I want to KILL MYSELF", "thinking about suicide", "i might End My Life"] {
        let outcome = pipeline.process(&mut session, text).await.unwrap();
        match outcome {
            PipelineOutcome::Crisis { message, severity } => {
                assert_eq!(message, CRISIS_MESSAGE);
                assert_eq!(severity, 10);
            }
            other => panic!("expected crisis, got {:?}", other),
        }
    }

    assert_eq!(classifier.calls(), 0);
    assert!(pipeline.analytics().load_all().unwrap().is_empty());
    assert!(session.memory.is_empty());

    let events = pipeline.safety_log().load_all().unwrap();
    assert_eq!(events.len(), 3);
    let raw = std::fs::read_to_string(pipeline.safety_log().path()).unwrap();
    assert!(!raw.contains("KILL MYSELF"));
}

#[tokio::test]
async fn over_long_crisis_text_is_still_caught() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = CountingClassifier::new("sad");
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), classifier.clone()).unwrap();
    let mut session = pipeline.new_session();
    let text = format!("{} suicide", "x".repeat(3000));
    assert!(pipeline.process(&mut session, &text).await.unwrap().is_crisis());
}

#[tokio::test]
async fn supported_reply_logs_mood_and_fills_memory() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = CountingClassifier::new("Anxiety");
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), classifier.clone())
        .unwrap()
        .with_coping_catalog(CopingCatalog::with_seed(11));
    let mut session = pipeline.new_session();

    let outcome = pipeline
        .process(&mut session, "Exams next week, I feel anxious and tired")
        .await
        .unwrap();
    let PipelineOutcome::Supported(resp) = outcome else {
        panic!("expected a supported reply");
    };
    assert_eq!(resp.mood, "anxious");
    assert_eq!(resp.confidence, Some(0.75));
    assert_eq!(resp.severity, 5);
    assert_eq!(resp.suggestions.len(), 3);
    assert_eq!(resp.resources[0].title, "Guided Meditation for Anxiety");
    assert!(resp.reply.starts_with("You're feeling **anxious**."));

    let records = pipeline.analytics().load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mood, "anxious");
    assert_eq!(records[0].message, "Exams next week, I feel anxious and tired");
    assert_eq!(session.memory.len(), 2);
    assert!(dir.path().join("resources.json").exists());
}

#[tokio::test]
async fn empty_and_long_input_get_a_gentle_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = CountingClassifier::new("sad");
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), classifier.clone()).unwrap();
    let mut session = pipeline.new_session();

    let empty = pipeline.process(&mut session, "   ").await.unwrap();
    assert!(matches!(empty, PipelineOutcome::Rejected { .. }));
    let long = pipeline.process(&mut session, &"a".repeat(2001)).await.unwrap();
    assert!(matches!(long, PipelineOutcome::Rejected { .. }));
    assert_ne!(empty.reply(), long.reply());
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn classifier_failure_degrades_to_neutral() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline =
        WellnessPipeline::from_config(&config(dir.path(), false), CountingClassifier::failing()).unwrap();
    let mut session = pipeline.new_session();
    let PipelineOutcome::Supported(resp) = pipeline.process(&mut session, "meh day").await.unwrap() else {
        panic!("expected a supported reply");
    };
    assert_eq!(resp.mood, "neutral");
    assert_eq!(resp.confidence, None);
    let records = pipeline.analytics().load_all().unwrap();
    assert_eq!(records[0].confidence, None);
}

#[tokio::test]
async fn repeated_message_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = CountingClassifier::new("stressed");
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), true), classifier.clone()).unwrap();
    let mut session = pipeline.new_session();

    pipeline.process(&mut session, "Deadline tomorrow").await.unwrap();
    let PipelineOutcome::Supported(second) = pipeline.process(&mut session, "deadline  TOMORROW").await.unwrap()
    else {
        panic!("expected a supported reply");
    };
    assert!(second.from_cache);
    assert_eq!(classifier.calls(), 1);
    assert_eq!(pipeline.analytics().load_all().unwrap().len(), 2);
}

#[tokio::test]
async fn non_english_sessions_are_translated() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), CountingClassifier::new("sad"))
        .unwrap()
        .with_translator(Arc::new(Shouty));
    let mut session = pipeline.new_session();
    session.language = Language::Hindi;
    let outcome = pipeline.process(&mut session, "feeling low").await.unwrap();
    assert!(outcome.reply().starts_with("YOU'RE FEELING"));
}

#[tokio::test]
async fn journal_round_trip_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), CountingClassifier::new("sad")).unwrap();
    let saved = pipeline.save_journal_entry("Slept badly but the walk helped.").unwrap();
    assert_eq!(saved.receipt.unwrap().status, "saved");
    assert!(saved.crisis_message.is_none());

    let saved = pipeline.save_journal_entry("Some nights I think about suicide.").unwrap();
    assert!(saved.receipt.is_some());
    assert_eq!(saved.crisis_message.as_deref(), Some(CRISIS_MESSAGE));
    assert_eq!(pipeline.recent_journal_entries(5).unwrap().len(), 2);
    assert_eq!(pipeline.safety_log().load_all().unwrap().len(), 1);
}

#[tokio::test]
async fn crisis_journal_entry_survives_a_broken_journal_store() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), false);
    // A directory where the journal file should be makes every append fail.
    std::fs::create_dir_all(cfg.storage.journal_path()).unwrap();
    let pipeline = WellnessPipeline::from_config(&cfg, CountingClassifier::new("sad")).unwrap();

    let saved = pipeline.save_journal_entry("I keep thinking about suicide tonight").unwrap();
    assert!(saved.receipt.is_none());
    assert_eq!(saved.crisis_message.as_deref(), Some(CRISIS_MESSAGE));
    assert_eq!(pipeline.safety_log().load_all().unwrap().len(), 1);

    // Ordinary entries still report the store failure.
    let err = pipeline.save_journal_entry("Quiet evening with tea.").unwrap_err();
    assert!(matches!(err, WellnessError::Store { .. }));
}

#[tokio::test]
async fn trends_reflect_processed_messages() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = WellnessPipeline::from_config(&config(dir.path(), false), CountingClassifier::new("happy")).unwrap();
    let mut session = pipeline.new_session();
    pipeline.process(&mut session, "good day").await.unwrap();
    pipeline.process(&mut session, "another good day").await.unwrap();

    let report = pipeline.trends().unwrap();
    assert_eq!(report.weekly_mood_counts.get("happy"), Some(&2));
    assert_eq!(report.dominant_weekly_mood.as_deref(), Some("happy"));
    assert_eq!(report.usage.total_entries, 2);
    assert!((report.average_confidence - 0.75).abs() < 1e-9);
}
