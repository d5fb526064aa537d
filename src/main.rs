use chrono::Local;
use color_eyre::eyre::{eyre, Result};
use elecmate_diary::config::{AppConfig, DEFAULT_CONFIG_FILE};
use elecmate_diary::entry_store::{EntryStore, JsonFileStore};
use elecmate_diary::recent_cache::FileStore;
use elecmate_diary::scrap_metal::fetch_price_table;
use elecmate_diary::supabase::SupabaseClient;
use elecmate_diary::Diary;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = AppConfig::load(&config_path)?;

    let store: Box<dyn EntryStore> = if config.supabase.is_configured() {
        let mut client = SupabaseClient::new(&config.supabase);
        if let Ok(token) = env::var("SUPABASE_ACCESS_TOKEN") {
            client = client.with_access_token(token);
        }
        Box::new(client)
    } else {
        Box::new(
            JsonFileStore::open(&config.entries_file)
                .map_err(|e| eyre!("Failed to load diary: {}", e))?,
        )
    };
    let local = FileStore::new(&config.local_store_file);
    let diary = Diary::new(store.as_ref(), &local, config.streak_config());

    let today = Local::now().date_naive();
    let (entries, status) = diary.snapshot(today).await?;

    log::info!("{} diary entries", entries.len());
    println!("{}", status.streak_message);
    println!(
        "Streak: {} day(s){}",
        status.current_streak,
        match status.next_milestone {
            Some(m) => format!(", {} to go until {}", status.days_to_next_milestone, m),
            None => String::new(),
        }
    );
    println!(
        "{}",
        if status.logged_today {
            "Add Another Entry"
        } else {
            "Log Today"
        }
    );

    let recent = diary.site_suggestions();
    if !recent.is_empty() {
        println!("Recent sites: {}", recent.join(", "));
    }

    if let Some(url) = &config.price_feed_url {
        let prices = fetch_price_table(&reqwest::Client::new(), url).await;
        log::info!("scrap prices loaded ({:?})", prices.source);
    }

    Ok(())
}
