//! One poll cycle: list upcoming events, skip the ones already handled,
//! dispatch the actions of the rest.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use shared_types::CalendarEvent;

use crate::actions::parse_actions;
use crate::cache::DedupCache;
use crate::dispatcher::ChoreClient;
use crate::error::PollerResult;

/// How far back each query reaches, independent of the cache window
pub const LOOKBACK_SECS: i64 = 10;

/// Source of calendar events starting within a time range
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> PollerResult<Vec<CalendarEvent>>;
}

/// Outcome counts for one poll cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub fetched: usize,
    pub skipped: usize,
    pub dispatched: usize,
    pub failed: usize,
}

pub struct Poller {
    source: Box<dyn EventSource>,
    chores: ChoreClient,
    range: Duration,
}

impl Poller {
    pub fn new(source: impl EventSource + 'static, chores: ChoreClient, range_secs: u64) -> Self {
        Self {
            source: Box::new(source),
            chores,
            range: Duration::seconds(range_secs as i64),
        }
    }

    /// Query bounds for a cycle starting at `now`
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::seconds(LOOKBACK_SECS), now + self.range)
    }

    /// Run one cycle against `cache`.
    ///
    /// Failing events are logged and left unmarked so the next cycle retries
    /// them. Cache backend errors abort the cycle.
    pub async fn poll_once(
        &self,
        cache: &mut DedupCache,
        now: DateTime<Utc>,
    ) -> PollerResult<PollSummary> {
        let (time_min, time_max) = self.window(now);
        tracing::debug!(
            "Listing events from {} to {}",
            time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_max.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        let events = self.source.list_events(time_min, time_max).await?;
        let mut summary = PollSummary {
            fetched: events.len(),
            ..Default::default()
        };

        for event in &events {
            if cache.seen(&event.id).await? {
                tracing::debug!("Skipping already handled event {}", event.id);
                summary.skipped += 1;
                continue;
            }

            match self.process_event(event).await {
                Ok(count) => {
                    cache.mark_seen(&event.id, now.timestamp()).await?;
                    tracing::info!("Handled event {} ({} actions)", event.id, count);
                    summary.dispatched += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!("Failed to process event {}: {:?}", event.id, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Dispatch every action in the description; stops at the first failure.
    async fn process_event(&self, event: &CalendarEvent) -> PollerResult<usize> {
        let actions = parse_actions(&event.description);

        for action in &actions {
            self.chores.dispatch(action).await?;
        }

        Ok(actions.len())
    }
}
