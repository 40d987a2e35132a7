//! Classification cache: hot DashMap in front of a Sled tree.
//!
//! Keyed by a SHA-256 of the message after trimming, lowercasing and collapsing
//! whitespace, so "I'm  Stressed" and "i'm stressed" share one classifier call and no
//! message text is stored on disk. The hot layer is bounded; the oldest entry is
//! dropped when it is full.

use crate::error::WellnessResult;
use crate::shared::MoodAssessment;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sled::Db;
use std::path::Path;
use std::sync::Arc;

const TREE_NAME: &str = "classifications";
pub const DEFAULT_HOT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAssessment {
    pub assessment: MoodAssessment,
    pub cached_at: DateTime<Utc>,
}

fn normalize(message: &str) -> String {
    message
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hex SHA-256 of the normalised message.
pub fn cache_key(message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(message).as_bytes());
    hex::encode(hasher.finalize())
}

pub struct ClassificationCache {
    tree: sled::Tree,
    _db: Db,
    hot: Arc<DashMap<String, CachedAssessment>>,
    hot_capacity: usize,
}

impl ClassificationCache {
    pub fn open_path<P: AsRef<Path>>(path: P) -> WellnessResult<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self {
            tree,
            _db: db,
            hot: Arc::new(DashMap::new()),
            hot_capacity: DEFAULT_HOT_CAPACITY,
        })
    }

    pub fn with_hot_capacity(mut self, capacity: usize) -> Self {
        self.hot_capacity = capacity.max(1);
        self
    }

    fn promote(&self, key: String, cached: CachedAssessment) {
        if !self.hot.contains_key(&key) && self.hot.len() >= self.hot_capacity {
            let oldest = self
                .hot
                .iter()
                .min_by_key(|e| e.value().cached_at)
                .map(|e| e.key().clone());
            if let Some(k) = oldest {
                self.hot.remove(&k);
            }
        }
        self.hot.insert(key, cached);
    }

    /// Hot layer first, then Sled; a Sled hit is promoted into the hot layer.
    pub fn get(&self, message: &str) -> WellnessResult<Option<CachedAssessment>> {
        let key = cache_key(message);
        if let Some(v) = self.hot.get(&key) {
            return Ok(Some(v.clone()));
        }
        let Some(raw) = self.tree.get(key.as_bytes())? else {
            return Ok(None);
        };
        let cached: CachedAssessment = serde_json::from_slice(&raw)?;
        self.promote(key, cached.clone());
        Ok(Some(cached))
    }

    pub fn insert(&self, message: &str, assessment: &MoodAssessment) -> WellnessResult<()> {
        let key = cache_key(message);
        let cached = CachedAssessment {
            assessment: assessment.clone(),
            cached_at: Utc::now(),
        };
        self.tree.insert(key.as_bytes(), serde_json::to_vec(&cached)?)?;
        self.promote(key, cached);
        Ok(())
    }

    pub fn clear(&self) -> WellnessResult<()> {
        self.tree.clear()?;
        self.hot.clear();
        tracing::info!(target: "solace::cache", "Classification cache cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn flush(&self) -> WellnessResult<()> {
        self.tree.flush()?;
        Ok(())
    }
}
