use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time;

use crate::cache::DedupCache;
use crate::error::PollerResult;
use crate::poller::Poller;

/// Owns the dedup cache and drives the poller forever
pub struct PollingScheduler {
    poller: Poller,
    cache: DedupCache,
    interval: Duration,
}

impl PollingScheduler {
    pub fn new(poller: Poller, cache: DedupCache, interval: Duration) -> Self {
        Self {
            poller,
            cache,
            interval,
        }
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Poll, evict, sleep, repeat. Only returns on a cache backend failure.
    pub async fn run(&mut self) -> PollerResult<()> {
        tracing::info!(
            "Calendar poller started (interval: {:?}, dedup window: {}s)",
            self.interval,
            self.cache.window_secs()
        );

        loop {
            self.tick(Utc::now()).await?;
            time::sleep(self.interval).await;
        }
    }

    pub async fn tick(&mut self, now: DateTime<Utc>) -> PollerResult<()> {
        tracing::debug!("Running calendar poll cycle");

        match self.poller.poll_once(&mut self.cache, now).await {
            Ok(summary) => tracing::info!(
                "Poll cycle done: {} fetched, {} skipped, {} dispatched, {} failed",
                summary.fetched,
                summary.skipped,
                summary.dispatched,
                summary.failed
            ),
            Err(e) if e.is_fatal() => {
                tracing::error!("Dedup cache unavailable, stopping: {:?}", e);
                return Err(e);
            }
            // Continue polling even on error
            Err(e) => tracing::error!("Calendar polling error: {:?}", e),
        }

        let evicted = self.cache.evict(now.timestamp());
        if evicted > 0 {
            tracing::debug!("Evicted {} local cache entries", evicted);
        }

        Ok(())
    }
}
