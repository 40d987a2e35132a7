//! Input checks. All failures are `WellnessError::Validation`, which callers turn into a
//! fallback or a gentle prompt rather than an error page.

use crate::error::{WellnessError, WellnessResult};
use crate::shared::Mood;

pub const MAX_INPUT_CHARS: usize = 2000;
pub const MIN_JOURNAL_CHARS: usize = 5;

pub fn validate_user_input(text: &str) -> WellnessResult<()> {
    if text.trim().is_empty() {
        return Err(WellnessError::Validation("message is empty".into()));
    }
    let chars = text.chars().count();
    if chars > MAX_INPUT_CHARS {
        return Err(WellnessError::Validation(format!(
            "message is {} characters; the limit is {}",
            chars, MAX_INPUT_CHARS
        )));
    }
    Ok(())
}

pub fn validate_mood_label(label: &str) -> WellnessResult<Mood> {
    Mood::parse(label).ok_or_else(|| WellnessError::Validation(format!("unknown mood label '{}'", label.trim())))
}

pub fn validate_journal_entry(text: &str) -> WellnessResult<()> {
    if text.trim().chars().count() < MIN_JOURNAL_CHARS {
        return Err(WellnessError::Validation(format!(
            "journal entries need at least {} characters",
            MIN_JOURNAL_CHARS
        )));
    }
    Ok(())
}

/// Checks that `value` is a JSON object carrying every key in `required`.
pub fn validate_required_keys(value: &serde_json::Value, required: &[&str]) -> WellnessResult<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| WellnessError::Validation("expected a JSON object".into()))?;
    let missing: Vec<&str> = required.iter().copied().filter(|k| !obj.contains_key(*k)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WellnessError::Validation(format!("missing keys: {}", missing.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_input_bounds() {
        assert!(validate_user_input("hello").is_ok());
        assert!(validate_user_input("   \n").is_err());
        assert!(validate_user_input("").is_err());
        assert!(validate_user_input(&"a".repeat(MAX_INPUT_CHARS)).is_ok());
        assert!(validate_user_input(&"a".repeat(MAX_INPUT_CHARS + 1)).is_err());
    }

    #[test]
    fn mood_labels() {
        assert_eq!(validate_mood_label("Anxiety").unwrap(), Mood::Anxious);
        assert!(validate_mood_label("bored").is_err());
    }

    #[test]
    fn required_keys() {
        let v = json!({"mood": "sad", "confidence": 0.4});
        assert!(validate_required_keys(&v, &["mood", "confidence"]).is_ok());
        let err = validate_required_keys(&v, &["mood", "reason"]).unwrap_err();
        assert!(err.to_string().contains("reason"));
        assert!(validate_required_keys(&json!([1]), &["mood"]).is_err());
    }
}
