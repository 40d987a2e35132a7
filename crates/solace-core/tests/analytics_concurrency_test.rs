//! Concurrent appenders must leave a well-formed log with exactly one header.

use solace_core::analytics::{AnalyticsStore, TrendAggregator, ANALYTICS_HEADER};
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_appends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emotion_logs.csv");
    let shared = Arc::new(AnalyticsStore::new(&path));

    let mut handles = Vec::new();
    for worker in 0..8 {
        // Half the workers share one handle, the rest open their own on the same file.
        let store = if worker % 2 == 0 {
            Arc::clone(&shared)
        } else {
            Arc::new(AnalyticsStore::new(&path))
        };
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let msg = format!("worker {}, message {}, with \"quotes\"\nand a newline", worker, i);
                store.append("stressed", Some(0.5), &msg).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let records = shared.load_all().unwrap();
    assert_eq!(records.len(), 200);
    assert!(records.iter().all(|r| r.message.ends_with("and a newline")));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.matches(ANALYTICS_HEADER).count(), 1);

    let agg = TrendAggregator::from_store(&shared).unwrap();
    assert_eq!(agg.weekly_mood_counts().get("stressed"), Some(&200));
    assert_eq!(agg.usage_stats().total_entries, 200);
}

#[test]
fn reader_ignores_half_written_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emotion_logs.csv");
    let store = AnalyticsStore::new(&path);
    store.append("sad", Some(0.3), "complete").unwrap();

    let mut raw = std::fs::read_to_string(&path).unwrap();
    raw.push_str("2025-01-01T00:00:00Z,happy,0.9,\"half writ");
    std::fs::write(&path, raw).unwrap();

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "complete");
}
