use anyhow::{Context, Result};
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calendar_poller::{
    CalendarClient, ChoreClient, DedupCache, MemoryStore, Poller, PollerConfig, PollingScheduler,
    RedisStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PollerConfig::from_env()?;

    tracing::info!(
        "Starting calendar poller (calendar: {}, chore api: {}, redis: {}:{}, range: {}s, sleep: {}s)",
        config.calendar_name,
        config.chore_api,
        config.redis_host,
        config.redis_port,
        config.range_secs,
        config.sleep_secs
    );

    let calendar = CalendarClient::new(&config)
        .await
        .context("Failed to create calendar client")?;

    let store = RedisStore::connect(&config.redis_host, config.redis_port)
        .context("Failed to create Redis pool")?;
    let cache = DedupCache::new(
        MemoryStore::new(),
        store,
        config.key_prefix(),
        config.range_secs,
    );

    let poller = Poller::new(calendar, ChoreClient::new(&config.chore_api), config.range_secs);
    let mut scheduler =
        PollingScheduler::new(poller, cache, Duration::from_secs(config.sleep_secs));

    tokio::select! {
        result = scheduler.run() => {
            result.context("Calendar poller stopped")?;
        }
        result = signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown signal received, stopping...");
        }
    }

    tracing::info!("Calendar poller stopped");
    Ok(())
}
