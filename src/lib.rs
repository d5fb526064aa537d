pub mod config;
pub mod diary;
pub mod diary_entry;
pub mod draft;
pub mod entry_store;
pub mod error;
pub mod materials;
pub mod photos;
pub mod recent_cache;
pub mod scrap_metal;
pub mod streak;
pub mod supabase;

pub use diary::Diary;
pub use diary_entry::{DiaryEntry, SkillCategory};
pub use draft::EntryDraft;
pub use streak::{calculate_streak, has_logged_today, StreakConfig, StreakState};
