//! Best-effort "recently used" label lists backed by a local key-value store.
//!
//! Nothing here is authoritative: storage failures degrade to an empty list.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub const RECENT_TASKS_KEY: &str = "elec-mate-recent-tasks";
pub const RECENT_SITES_KEY: &str = "elec-mate-recent-sites";
pub const MAX_RECENT: usize = 20;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// String key-value storage, the local equivalent of browser storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| color_eyre::eyre::eyre!("memory store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| color_eyre::eyre::eyre!("memory store poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys live in a single JSON object on disk.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let serialized = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&serialized)?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| color_eyre::eyre::eyre!("file store poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| color_eyre::eyre::eyre!("file store poisoned"))?;
        // A corrupt file is replaced rather than blocking the write.
        let mut all = self.read_all().unwrap_or_default();
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(&all)?)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct RecentLabels(Vec<String>);

/// Bounded, duplicate-free, most-recent-first list of labels.
pub struct RecentCache<'a> {
    store: &'a dyn KeyValueStore,
    key: &'static str,
    capacity: usize,
}

impl<'a> RecentCache<'a> {
    pub fn new(store: &'a dyn KeyValueStore, key: &'static str) -> Self {
        RecentCache {
            store,
            key,
            capacity: MAX_RECENT,
        }
    }

    pub fn tasks(store: &'a dyn KeyValueStore) -> Self {
        Self::new(store, RECENT_TASKS_KEY)
    }

    pub fn sites(store: &'a dyn KeyValueStore) -> Self {
        Self::new(store, RECENT_SITES_KEY)
    }

    pub fn labels(&self) -> Vec<String> {
        let raw = match self.store.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("recent cache {} unreadable: {}", self.key, e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<RecentLabels>(&raw) {
            Ok(RecentLabels(mut labels)) => {
                let mut seen = std::collections::HashSet::new();
                labels.retain(|l| seen.insert(l.clone()));
                labels.truncate(self.capacity);
                labels
            }
            Err(e) => {
                log::warn!("recent cache {} corrupted, ignoring: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Adds `label` to the front unless it is already cached. Existing
    /// labels keep their position.
    pub fn record(&self, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        let mut labels = self.labels();
        if labels.iter().any(|l| l == label) {
            return;
        }
        labels.insert(0, label.to_string());
        labels.truncate(self.capacity);

        let result = serde_json::to_string(&RecentLabels(labels))
            .map_err(Into::into)
            .and_then(|serialized| self.store.set(self.key, &serialized));
        if let Err(e) = result {
            log::warn!("failed to persist recent cache {}: {}", self.key, e);
        }
    }

    pub fn suggestions(&self, excluding: &[String], limit: usize) -> Vec<String> {
        self.labels()
            .into_iter()
            .filter(|l| !excluding.contains(l))
            .take(limit)
            .collect()
    }
}
