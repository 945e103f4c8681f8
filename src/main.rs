use anyhow::Result;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};
use wbm_scout::config::Config;
use wbm_scout::models::berlin_now;
use wbm_scout::notifiers::{ConsoleNotifier, Notifier, TelegramNotifier};
use wbm_scout::scrapers::{ListingExtractor, WbmFetcher};
use wbm_scout::{logging, KnownSetStore, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;
    let config = Config::from_env()?;

    info!("🏠 WBM Scout - apartment offer watcher");
    info!(
        "Scraping every {} minutes between {}:00 and {}:00 ({:?})",
        config.schedule.interval_minutes,
        config.schedule.start_hour,
        config.schedule.end_hour,
        config.schedule.days
    );

    let notifier: Box<dyn Notifier> = match &config.telegram {
        Some(telegram) => Box::new(TelegramNotifier::new(&telegram.token, &telegram.chat_id)?),
        None => {
            warn!("TELEGRAM_TOKEN not set, matches will only be logged");
            Box::new(ConsoleNotifier)
        }
    };

    let fetcher = WbmFetcher::with_url(&config.source_url)?;
    let pipeline = Pipeline::new(ListingExtractor::new()?, config.filter.clone(), notifier);
    let mut store = KnownSetStore::load(&config.data_file);

    let mut ticker = time::interval(config.schedule.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }

        let now = berlin_now();
        if !config.schedule.is_active(&now) {
            info!("Outside the schedule at {}, skipping", now.format("%a %H:%M"));
            continue;
        }

        info!("Starting scrape at {}", now.format("%H:%M:%S"));
        if let Err(e) = pipeline.scrape(&fetcher, &mut store).await {
            error!("Scrape failed: {}", e);
        }
    }

    Ok(())
}
