use crate::streak::{StreakConfig, DEFAULT_MILESTONES};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "elecmate_diary.json";
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub entries_table: String,
    pub photo_bucket: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        SupabaseConfig {
            url: String::new(),
            anon_key: String::new(),
            entries_table: "site_diary_entries".to_string(),
            photo_bucket: "site-diary-photos".to_string(),
        }
    }
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub entries_file: PathBuf,
    pub local_store_file: PathBuf,
    pub milestones: Vec<u32>,
    pub max_photo_bytes: usize,
    pub price_feed_url: Option<String>,
    pub supabase: SupabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            entries_file: PathBuf::from("diary_entries.json"),
            local_store_file: PathBuf::from("local_storage.json"),
            milestones: DEFAULT_MILESTONES.to_vec(),
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            price_feed_url: None,
            supabase: SupabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path` if it exists, otherwise starts from defaults. Environment
    /// variables override the Supabase connection either way.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents)
                .wrap_err_with(|| format!("Invalid config in {}", path.display()))?
        } else {
            log::info!("no config at {}, using defaults", path.display());
            AppConfig::default()
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.supabase.url = url;
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = key;
        }
        if let Some(url) = lookup("ELECMATE_PRICE_FEED_URL") {
            self.price_feed_url = Some(url);
        }
    }

    pub fn streak_config(&self) -> StreakConfig {
        StreakConfig::new(self.milestones.clone())
    }
}
