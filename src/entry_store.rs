use crate::diary_entry::DiaryEntry;
use async_trait::async_trait;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// The authoritative collection of diary entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<DiaryEntry>>;
    async fn create(&self, entry: DiaryEntry) -> Result<DiaryEntry>;
    async fn update(&self, entry: DiaryEntry) -> Result<DiaryEntry>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct DiaryState {
    entries: Vec<DiaryEntry>,
    next_id: usize,
}

/// Entry store kept in a local JSON file, used offline and in tests.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<DiaryState>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            log::info!("no diary file at {}, starting empty", path.display());
            DiaryState {
                entries: Vec::new(),
                next_id: 1,
            }
        };
        Ok(JsonFileStore {
            path,
            state: Mutex::new(state),
        })
    }

    fn load_from_file(path: &Path) -> Result<DiaryState> {
        let serialized = fs::read_to_string(path)?;
        let state: DiaryState = serde_json::from_str(&serialized)?;
        Ok(state)
    }

    fn save_to_file(&self, state: &DiaryState) -> Result<()> {
        let serialized = serde_json::to_string(state)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Memory only changes once `next` is on disk.
    fn commit(&self, state: &mut DiaryState, next: DiaryState) -> Result<()> {
        self.save_to_file(&next)?;
        *state = next;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<DiaryEntry>> {
        let state = self.state.lock().await;
        let mut entries = state.entries.clone();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn create(&self, mut entry: DiaryEntry) -> Result<DiaryEntry> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        entry.id = Some(next.next_id.max(1).to_string());
        next.next_id = next.next_id.max(1) + 1;
        next.entries.push(entry.clone());
        self.commit(&mut state, next)?;
        Ok(entry)
    }

    async fn update(&self, updated_entry: DiaryEntry) -> Result<DiaryEntry> {
        let mut state = self.state.lock().await;
        let id = updated_entry
            .id
            .clone()
            .ok_or_else(|| eyre!("cannot update an entry without an id"))?;
        let mut next = state.clone();
        let entry = next
            .entries
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| eyre!("entry {} not found", id))?;
        *entry = updated_entry.clone();
        self.commit(&mut state, next)?;
        Ok(updated_entry)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.entries.retain(|e| e.id.as_deref() != Some(id));
        self.commit(&mut state, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(date: &str, site: &str) -> DiaryEntry {
        let mut e = DiaryEntry::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), site);
        e.date = date.to_string();
        e
    }

    #[tokio::test]
    async fn create_update_delete_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary_entries.json");

        let store = JsonFileStore::open(&path).unwrap();
        let first = store.create(entry("2024-06-01", "Depot")).await.unwrap();
        let second = store.create(entry("2024-06-02", "School")).await.unwrap();
        assert_eq!(first.id.as_deref(), Some("1"));
        assert_eq!(second.id.as_deref(), Some("2"));

        let mut edited = second.clone();
        edited.supervisor = Some("Dave".into());
        store.update(edited).await.unwrap();
        store.delete("1").await.unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let entries = reopened.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].supervisor.as_deref(), Some("Dave"));

        let third = reopened.create(entry("2024-06-03", "Depot")).await.unwrap();
        assert_eq!(third.id.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("d.json")).unwrap();
        store.create(entry("2024-06-01", "A")).await.unwrap();
        store.create(entry("2024-06-03", "B")).await.unwrap();
        store.create(entry("2024-06-02", "C")).await.unwrap();
        let sites: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.site_name)
            .collect();
        assert_eq!(sites, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("missing_dir").join("d.json")).unwrap();

        assert!(store.create(entry("2024-06-01", "Depot")).await.is_err());
        assert!(store.list().await.unwrap().is_empty());

        fs::create_dir(dir.path().join("missing_dir")).unwrap();
        let created = store.create(entry("2024-06-02", "Depot")).await.unwrap();
        assert_eq!(created.id.as_deref(), Some("1"));

        fs::remove_dir_all(dir.path().join("missing_dir")).unwrap();
        let mut edited = created.clone();
        edited.site_name = "School".into();
        assert!(store.update(edited).await.is_err());
        assert!(store.delete("1").await.is_err());

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].site_name, "Depot");
    }

    #[tokio::test]
    async fn updating_unknown_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("d.json")).unwrap();
        let mut ghost = entry("2024-06-01", "Nowhere");
        ghost.id = Some("99".into());
        assert!(store.update(ghost).await.is_err());
        assert!(store.update(entry("2024-06-01", "No id")).await.is_err());
    }
}
