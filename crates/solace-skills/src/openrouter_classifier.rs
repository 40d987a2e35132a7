//! OpenRouter mood classifier: one chat completion per message, JSON reply.
//!
//! API key: `OPENROUTER_API_KEY` (or `SOLACE_LLM_API_KEY`) in `.env`.
//! Model: `SOLACE_LLM_MODEL`, default `meta-llama/llama-3.3-70b-instruct`.

use serde::{Deserialize, Serialize};
use solace_core::validators::validate_required_keys;
use solace_core::{normalize_mood_label, Mood, MoodAssessment, MoodClassifier, WellnessError, WellnessResult};
use std::time::Duration;

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct";

const SYSTEM_PROMPT: &str = "You are an empathetic assistant that reads a student's message and \
    identifies their current mood. Reply with JSON only, no prose, in the form \
    {\"mood\": \"<label>\", \"confidence\": <0.0-1.0>, \"reason\": \"<one short sentence>\"}. \
    The label must be one of: happy, sad, stressed, anxious, angry, neutral, tired, overwhelmed.";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

pub struct OpenRouterClassifier {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterClassifier {
    /// `None` when no API key is configured.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENROUTER_API_KEY")
            .or_else(|_| std::env::var("SOLACE_LLM_API_KEY"))
            .ok()?;
        let key = key.trim().to_string();
        if key.is_empty() {
            return None;
        }
        let classifier = Self::new(key);
        Some(match std::env::var("SOLACE_LLM_MODEL") {
            Ok(m) if !m.trim().is_empty() => classifier.with_model(m.trim()),
            _ => classifier,
        })
    }

    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, message: &str) -> WellnessResult<String> {
        let url = format!("{}/chat/completions", OPENROUTER_API_BASE);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            temperature: Some(0.0),
            max_tokens: Some(200),
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", "solace-mood-classifier")
            .json(&body)
            .send()
            .await
            .map_err(|e| WellnessError::Classifier(format!("OpenRouter request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(WellnessError::Classifier(format!("OpenRouter API error {}: {}", status, text)));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| WellnessError::Classifier(format!("OpenRouter response parse failed: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| WellnessError::Classifier("OpenRouter returned no choices".into()))
    }
}

#[async_trait::async_trait]
impl MoodClassifier for OpenRouterClassifier {
    async fn classify(&self, message: &str) -> WellnessResult<MoodAssessment> {
        let raw = self.complete(message).await?;
        parse_classifier_reply(&raw)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

/// Pulls the JSON object out of a model reply (code fences and chatter around it are
/// tolerated), checks its keys and maps the label onto the mood vocabulary.
pub fn parse_classifier_reply(raw: &str) -> WellnessResult<MoodAssessment> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &raw[s..=e],
        _ => return Err(WellnessError::Classifier("no JSON object in classifier reply".into())),
    };
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| WellnessError::Classifier(format!("bad classifier JSON: {}", e)))?;
    validate_required_keys(&value, &["mood", "confidence"])
        .map_err(|e| WellnessError::Classifier(e.to_string()))?;

    let label = value["mood"].as_str().unwrap_or_default();
    let (mood, reason_prefix) = match Mood::parse(label) {
        Some(m) => (m.as_str().to_string(), None),
        None => (
            Mood::Neutral.as_str().to_string(),
            Some(format!("unrecognised label '{}'", normalize_mood_label(label))),
        ),
    };
    let confidence = value["confidence"]
        .as_f64()
        .or_else(|| value["confidence"].as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.0);
    let reason = value["reason"].as_str().unwrap_or_default().to_string();
    let reason = match reason_prefix {
        Some(p) if reason.is_empty() => p,
        Some(p) => format!("{}; {}", p, reason),
        None => reason,
    };
    Ok(MoodAssessment { mood, confidence, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let a = parse_classifier_reply(r#"{"mood": "Anxious", "confidence": 0.8, "reason": "exam"}"#).unwrap();
        assert_eq!(a.mood, "anxious");
        assert!((a.confidence - 0.8).abs() < 1e-9);
        assert_eq!(a.reason, "exam");
    }

    #[test]
    fn tolerates_fences_and_legacy_labels() {
        let raw = "Sure!\n```json\n{\"mood\": \"stress\", \"confidence\": \"0.6\"}\n```";
        let a = parse_classifier_reply(raw).unwrap();
        assert_eq!(a.mood, "stressed");
        assert!((a.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn unknown_label_falls_back_to_neutral() {
        let a = parse_classifier_reply(r#"{"mood": "bored", "confidence": 3}"#).unwrap();
        assert_eq!(a.mood, "neutral");
        assert_eq!(a.confidence, 1.0);
        assert!(a.reason.contains("bored"));
    }

    #[test]
    fn missing_keys_or_no_json_is_an_error() {
        assert!(parse_classifier_reply(r#"{"mood": "sad"}"#).is_err());
        assert!(parse_classifier_reply("I think you are sad").is_err());
    }
}
