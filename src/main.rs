use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info};
use rand::Rng;
use rusty_tee_times::args::validation::check_destinations;
use rusty_tee_times::args::{self, AppConfig, Command, FileConfig, SearchArgs};
use rusty_tee_times::model::{COURSE_TIMEZONE, SavedSearch, TeeTimes};
use rusty_tee_times::notify::EmailNotifier;
use rusty_tee_times::search::FederatedSearch;
use rusty_tee_times::search::reconcile::Reconciler;
use rusty_tee_times::sources::default_sources;
use rusty_tee_times::storage::{SearchStore, SqliteStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = args::args_checks();
    let file_config = match cli.config_toml.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = AppConfig::resolve(cli.db_path, file_config, |key| std::env::var(key).ok())?;
    let search = FederatedSearch::new(default_sources()).with_call_timeout(config.source_timeout);

    match cli.command {
        Command::FindTeeTimes(search_args) => find_tee_times(&config, search, &search_args).await,
        Command::PollForTeeTimes => poll_for_tee_times(&config, search).await,
    }
}

async fn find_tee_times(config: &AppConfig, search: FederatedSearch, search_args: &SearchArgs) -> Result<()> {
    let known: Vec<String> = search.course_names().into_iter().map(str::to_string).collect();
    let now = Utc::now().with_timezone(&COURSE_TIMEZONE).naive_local();
    let params = search_args.to_params(&known, now)?;

    if search_args.create_search {
        let destinations = search_args.destinations(config.default_email_destination.as_deref());
        check_destinations(search_args.notification_method, &destinations)?;

        let saved = SavedSearch::new(search_args.notification_method, destinations, params);
        let store = SqliteStore::open(&config.db_path)
            .with_context(|| format!("open database {}", config.db_path.display()))?;
        store.insert_search(&saved).await?;
        info!("Saved search {}", saved.id);
        println!("{}", saved.search_params.summary_message());
        println!("Created search {}", saved.id);
        return Ok(());
    }

    let tee_times: TeeTimes = search.search(&params).await.into_iter().collect();
    if tee_times.is_empty() {
        println!("No tee times found");
    } else {
        println!("{}", tee_times.message());
    }
    Ok(())
}

async fn poll_for_tee_times(config: &AppConfig, search: FederatedSearch) -> Result<()> {
    let notifier = Arc::new(EmailNotifier::new(config.smtp_settings()?));
    let search = Arc::new(search);

    loop {
        let secs = rand::thread_rng().gen_range(config.poll_sleep_secs.clone());
        info!("Sleeping for {secs} seconds");
        tokio::time::sleep(Duration::from_secs(secs)).await;

        let store = match SqliteStore::open(&config.db_path) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                error!("Could not open database {}: {err}", config.db_path.display());
                continue;
            }
        };
        let reconciler = Reconciler::new(Arc::clone(&search), store, notifier.clone());
        match reconciler.check_for_times().await {
            Ok(summary) => info!(
                "Poll finished: {} checked, {} expired, {} failed",
                summary.checked, summary.expired, summary.failed
            ),
            Err(err) => error!("Poll failed: {err}"),
        }
    }
}
