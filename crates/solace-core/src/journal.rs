//! Private journal: append-only text file, one framed entry per save.
//!
//! Entry layout: `\n[YYYY-MM-DD HH:MM:SS UTC]\n<text>\n<50 dashes>\n`.
//! A text line that would read as the separator is stored with a leading `\`, which
//! [`JournalStore::read_recent`] strips again.

use crate::error::WellnessResult;
use crate::storage::AppendFile;
use crate::validators::validate_journal_entry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENTRY_SEPARATOR_LEN: usize = 50;
pub const DEFAULT_RECENT_LIMIT: usize = 5;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn separator() -> String {
    "-".repeat(ENTRY_SEPARATOR_LEN)
}

/// True for the separator itself or any number of `\` in front of it.
fn looks_like_separator(line: &str) -> bool {
    line.trim_start_matches('\\').trim_end() == separator()
}

fn escape_body(body: &str) -> String {
    body.lines()
        .map(|l| {
            if looks_like_separator(l) {
                format!("\\{}", l)
            } else {
                l.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalReceipt {
    pub status: String,
    pub timestamp: String,
    pub length: usize,
}

#[derive(Debug)]
pub struct JournalStore {
    file: AppendFile,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AppendFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn save_entry(&self, text: &str) -> WellnessResult<JournalReceipt> {
        self.save_entry_at(text, Utc::now())
    }

    pub fn save_entry_at(&self, text: &str, at: DateTime<Utc>) -> WellnessResult<JournalReceipt> {
        validate_journal_entry(text)?;
        let body = text.trim();
        let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
        let framed = format!("\n[{}]\n{}\n{}\n", timestamp, escape_body(body), separator());
        self.file.append(None, &framed)?;
        let length = body.chars().count();
        tracing::info!(target: "solace::journal", length, "Journal entry saved");
        Ok(JournalReceipt {
            status: "saved".to_string(),
            timestamp,
            length,
        })
    }

    /// The last `limit` entries, oldest first, each including its timestamp line.
    pub fn read_recent(&self, limit: usize) -> WellnessResult<Vec<String>> {
        let Some(raw) = self.file.read_to_string()? else {
            return Ok(Vec::new());
        };
        let sep = separator();
        let mut entries = Vec::new();
        let mut current = String::new();
        for line in raw.lines() {
            if line.trim_end() == sep {
                let entry = current.trim();
                if !entry.is_empty() {
                    entries.push(entry.to_string());
                }
                current.clear();
            } else if looks_like_separator(line) {
                current.push_str(&line[1..]);
                current.push('\n');
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WellnessError;
    use chrono::TimeZone;

    #[test]
    fn saves_in_framed_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal_entries.txt");
        let store = JournalStore::new(&path);
        let at = Utc.with_ymd_and_hms(2025, 2, 1, 8, 30, 0).unwrap();
        let receipt = store.save_entry_at("  Today was long.  ", at).unwrap();
        assert_eq!(receipt.status, "saved");
        assert_eq!(receipt.timestamp, "2025-02-01 08:30:00 UTC");
        assert_eq!(receipt.length, 15);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            raw,
            format!("\n[2025-02-01 08:30:00 UTC]\nToday was long.\n{}\n", "-".repeat(50))
        );
    }

    #[test]
    fn reads_most_recent_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JournalStore::new(dir.path().join("journal_entries.txt"));
        for i in 0..7 {
            store.save_entry(&format!("entry number {}", i)).unwrap();
        }
        let recent = store.read_recent(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert!(recent[0].ends_with("entry number 2"));
        assert!(recent[4].ends_with("entry number 6"));
        assert!(recent[4].starts_with('['));
    }

    #[test]
    fn multi_line_entries_stay_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = JournalStore::new(dir.path().join("journal_entries.txt"));
        store.save_entry("first line\nsecond line").unwrap();
        let recent = store.read_recent(DEFAULT_RECENT_LIMIT).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].ends_with("first line\nsecond line"));
    }

    #[test]
    fn separator_lines_inside_an_entry_do_not_split_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = JournalStore::new(dir.path().join("journal_entries.txt"));
        let dashes = "-".repeat(ENTRY_SEPARATOR_LEN);
        let text = format!("before the line\n{}\n\\{}\nafter the line", dashes, dashes);
        store.save_entry(&text).unwrap();
        store.save_entry("second entry").unwrap();

        let recent = store.read_recent(5).unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].ends_with(&text));
        assert!(recent[1].ends_with("second entry"));
    }

    #[test]
    fn short_entries_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JournalStore::new(dir.path().join("journal_entries.txt"));
        assert!(matches!(store.save_entry("  hi  "), Err(WellnessError::Validation(_))));
        assert!(store.read_recent(5).unwrap().is_empty());
    }
}
