//! **ResourceCatalog**: mood label to external help links, backed by `resources.json`.
//!
//! The file is written with a starter set the first time it is needed and read once
//! per catalog instance after that. The starter file is written to a temporary name and
//! renamed into place, so a concurrent reader sees either no file or a complete one.

use crate::error::{WellnessError, WellnessResult};
use crate::shared::{normalize_mood_label, ResourceLink};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

pub const DEFAULT_KEY: &str = "default";

static TMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub type ResourceMap = BTreeMap<String, Vec<ResourceLink>>;

const STARTER_SET: &[(&str, &[(&str, &str)])] = &[
    (
        "stressed",
        &[
            ("Deep Breathing Exercise", "https://www.youtube.com/watch?v=UxedG8tEJ6Y"),
            ("5-min Stress Relief Routine", "https://www.youtube.com/watch?v=inpok4MKVLM"),
        ],
    ),
    (
        "anxious",
        &[
            ("Guided Meditation for Anxiety", "https://www.youtube.com/watch?v=O-6f5wQXSu8"),
            (
                "Anxiety Advice for Students",
                "https://www.mind.org.uk/information-support/types-of-mental-health-problems/anxiety/about-anxiety/",
            ),
        ],
    ),
    (
        "sad",
        &[
            ("Mood Uplifting Playlist", "https://www.youtube.com/watch?v=2OEL4P1Rz04"),
            (
                "Coping with Feeling Low",
                "https://www.healthline.com/health/mental-health/things-to-do-when-feeling-down",
            ),
        ],
    ),
    (
        "angry",
        &[
            (
                "Anger Management Tips",
                "https://www.mentalhealth.org.uk/explore-mental-health/publications/how-manage-and-reduce-stress",
            ),
            ("Progressive Muscle Relaxation", "https://www.youtube.com/watch?v=86HUcX8ZtAk"),
        ],
    ),
    (
        DEFAULT_KEY,
        &[
            ("Student Mental Health Guide", "https://www.unicef.org/parenting/mental-health"),
            ("How to Take Care of Mental Wellbeing", "https://www.nhs.uk/every-mind-matters/"),
        ],
    ),
];

pub fn starter_resources() -> ResourceMap {
    STARTER_SET
        .iter()
        .map(|(mood, links)| {
            (
                mood.to_string(),
                links.iter().map(|(t, l)| ResourceLink::new(t, l)).collect(),
            )
        })
        .collect()
}

#[derive(Debug)]
pub struct ResourceCatalog {
    path: PathBuf,
    loaded: OnceLock<ResourceMap>,
    init_lock: Mutex<()>,
}

impl ResourceCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the starter set if the backing file is missing.
    pub fn ensure_store(&self) -> WellnessResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| WellnessError::store(parent, e))?;
            }
        }
        let body = serde_json::to_string_pretty(&starter_resources())?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, body).map_err(|e| WellnessError::store(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(WellnessError::store(&self.path, e));
        }
        tracing::info!(target: "solace::catalog", path = %self.path.display(), "Resource catalog created with starter set");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resources.json".to_string());
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), n))
    }

    fn map(&self) -> WellnessResult<&ResourceMap> {
        if let Some(m) = self.loaded.get() {
            return Ok(m);
        }
        let _guard = self.init_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(m) = self.loaded.get() {
            return Ok(m);
        }
        self.ensure_store()?;
        let raw = std::fs::read_to_string(&self.path).map_err(|e| WellnessError::store(&self.path, e))?;
        let parsed: ResourceMap =
            serde_json::from_str(&raw).map_err(|e| WellnessError::corrupt(&self.path, e.to_string()))?;

        let mut map = ResourceMap::new();
        for (mood, links) in parsed {
            map.entry(normalize_mood_label(&mood)).or_default().extend(links);
        }
        if !map.contains_key(DEFAULT_KEY) {
            tracing::warn!(target: "solace::catalog", path = %self.path.display(), "Resource file has no default list; using starter default");
            map.insert(
                DEFAULT_KEY.to_string(),
                starter_resources().remove(DEFAULT_KEY).unwrap_or_default(),
            );
        }
        Ok(self.loaded.get_or_init(|| map))
    }

    /// Links for `mood`, or the default list when the mood has none.
    pub fn recommend(&self, mood: &str) -> WellnessResult<Vec<ResourceLink>> {
        let map = self.map()?;
        let key = normalize_mood_label(mood);
        let links = map
            .get(&key)
            .or_else(|| map.get(DEFAULT_KEY))
            .cloned()
            .unwrap_or_default();
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_lookup_materialises_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("resources.json");
        let catalog = ResourceCatalog::new(&path);
        assert!(!path.exists());
        let links = catalog.recommend("sad").unwrap();
        assert!(path.exists());
        assert_eq!(links[0].title, "Mood Uplifting Playlist");
    }

    #[test]
    fn legacy_and_canonical_spellings_agree() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ResourceCatalog::new(dir.path().join("resources.json"));
        let a = catalog.recommend("anxiety").unwrap();
        let b = catalog.recommend("ANXIETY ").unwrap();
        let c = catalog.recommend("anxious").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a[0].title, "Guided Meditation for Anxiety");
    }

    #[test]
    fn unknown_mood_gets_default_list() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ResourceCatalog::new(dir.path().join("resources.json"));
        let links = catalog.recommend("bored").unwrap();
        assert_eq!(links, starter_resources()[DEFAULT_KEY]);
    }

    #[test]
    fn existing_file_with_legacy_keys_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        std::fs::write(
            &path,
            r#"{"stress": [{"title": "Walk", "link": "https://example.org/walk"}],
                "default": [{"title": "Help", "link": "https://example.org/help"}]}"#,
        )
        .unwrap();
        let catalog = ResourceCatalog::new(&path);
        assert_eq!(catalog.recommend("stressed").unwrap()[0].title, "Walk");
        assert_eq!(catalog.recommend("happy").unwrap()[0].title, "Help");
    }

    #[test]
    fn concurrent_first_use_never_sees_a_partial_file() {
        for _ in 0..50 {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("resources.json");
            let shared = std::sync::Arc::new(ResourceCatalog::new(&path));
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let path = path.clone();
                    let shared = shared.clone();
                    std::thread::spawn(move || {
                        if i % 2 == 0 {
                            shared.recommend("sad")
                        } else {
                            ResourceCatalog::new(path).recommend("sad")
                        }
                    })
                })
                .collect();
            for h in handles {
                let links = h.join().unwrap().unwrap();
                assert_eq!(links[0].title, "Mood Uplifting Playlist");
            }
            let leftovers: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                .collect();
            assert!(leftovers.is_empty());
        }
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let catalog = ResourceCatalog::new(&path);
        assert!(matches!(catalog.recommend("sad"), Err(WellnessError::Corrupt { .. })));
    }
}
