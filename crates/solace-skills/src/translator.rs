//! Dictionary translator between English and Hindi.
//!
//! Whole-word, case-insensitive substitution in table order. Unknown words are left
//! alone, so a reply is never lost, only partly translated.

use once_cell::sync::Lazy;
use regex::Regex;
use solace_core::{Language, Translate};

const EN_TO_HI: &[(&str, &str)] = &[
    ("I am", "मैं"),
    ("sad", "उदास"),
    ("anxiety", "चिंता"),
    ("stress", "तनाव"),
    ("angry", "गुस्सा"),
    ("happy", "खुश"),
    ("tired", "थका हुआ"),
    ("feeling", "महसूस कर रहा हूँ"),
    ("help", "मदद"),
    ("need", "ज़रूरत है"),
    ("okay", "ठीक"),
    ("not", "नहीं"),
    ("very", "बहुत"),
];

const HI_TO_EN: &[(&str, &str)] = &[
    ("मुझे", "I"),
    ("डर", "fear"),
    ("लग रहा", "feeling"),
    ("है", "am"),
    ("चिंता", "anxiety"),
    ("हो रही", "having"),
    ("थक", "tired"),
    ("गया", "exhausted"),
    ("उदास", "sad"),
    ("खुश", "happy"),
    ("बहुत", "very"),
    ("ज़्यादा", "too much"),
    ("नहीं", "not"),
    ("ठीक", "okay"),
    ("सकता", "can"),
    ("सकती", "can"),
    ("मदद", "help"),
    ("चाहिए", "needed"),
    ("क्यों", "why"),
    ("मैं", "I"),
    ("परेशान", "upset"),
];

fn compile(table: &[(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    table
        .iter()
        .filter_map(|(from, to)| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(from)))
                .ok()
                .map(|re| (re, *to))
        })
        .collect()
}

static TO_HINDI: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| compile(EN_TO_HI));
static TO_ENGLISH: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| compile(HI_TO_EN));

fn apply(rules: &[(Regex, &'static str)], text: &str) -> String {
    let mut out = text.to_string();
    for (re, to) in rules {
        out = re.replace_all(&out, regex::NoExpand(to)).into_owned();
    }
    out
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DictionaryTranslator;

impl DictionaryTranslator {
    pub fn new() -> Self {
        Self
    }

    pub fn to_hindi(&self, text: &str) -> String {
        apply(&TO_HINDI, text)
    }

    /// Used on incoming Hindi messages before classification.
    pub fn to_english(&self, text: &str) -> String {
        apply(&TO_ENGLISH, text)
    }
}

impl Translate for DictionaryTranslator {
    fn translate(&self, text: &str, target: Language) -> String {
        match target {
            Language::English => self.to_english(text),
            Language::Hindi => self.to_hindi(text),
        }
    }
}
