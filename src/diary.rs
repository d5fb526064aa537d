use crate::diary_entry::DiaryEntry;
use crate::draft::EntryDraft;
use crate::entry_store::EntryStore;
use crate::recent_cache::{KeyValueStore, RecentCache, DEFAULT_SUGGESTION_LIMIT};
use crate::streak::{calculate_streak, StreakConfig, StreakState};
use chrono::NaiveDate;
use color_eyre::Result;

/// Ties the entry store, the local suggestion caches and the streak
/// derivation together for one signed-in user.
pub struct Diary<'a> {
    store: &'a dyn EntryStore,
    local: &'a dyn KeyValueStore,
    streak_config: StreakConfig,
}

impl<'a> Diary<'a> {
    pub fn new(
        store: &'a dyn EntryStore,
        local: &'a dyn KeyValueStore,
        streak_config: StreakConfig,
    ) -> Self {
        Diary {
            store,
            local,
            streak_config,
        }
    }

    pub async fn entries(&self) -> Result<Vec<DiaryEntry>> {
        self.store.list().await
    }

    pub async fn status(&self, today: NaiveDate) -> Result<StreakState> {
        Ok(self.snapshot(today).await?.1)
    }

    /// Entries and their streak state from a single store read.
    pub async fn snapshot(&self, today: NaiveDate) -> Result<(Vec<DiaryEntry>, StreakState)> {
        let entries = self.entries().await?;
        let state = calculate_streak(&entries, today, &self.streak_config);
        Ok((entries, state))
    }

    /// Creates or updates the entry behind `draft`, then feeds its tasks and
    /// site name into the suggestion caches.
    pub async fn save(&self, draft: EntryDraft) -> Result<DiaryEntry> {
        let is_edit = draft.is_edit();
        let entry = draft.into_entry()?;
        let saved = if is_edit {
            self.store.update(entry).await?
        } else {
            self.store.create(entry).await?
        };

        let tasks = RecentCache::tasks(self.local);
        for task in &saved.tasks_completed {
            tasks.record(task);
        }
        RecentCache::sites(self.local).record(&saved.site_name);

        log::info!(
            "{} diary entry for {} at {}",
            if is_edit { "updated" } else { "created" },
            saved.date,
            saved.site_name
        );
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await
    }

    pub fn task_suggestions(&self, draft: &EntryDraft) -> Vec<String> {
        RecentCache::tasks(self.local).suggestions(draft.tasks(), DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn site_suggestions(&self) -> Vec<String> {
        RecentCache::sites(self.local).suggestions(&[], DEFAULT_SUGGESTION_LIMIT)
    }
}
