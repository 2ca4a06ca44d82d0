//! Two-tier dedup cache for processed calendar events.
//!
//! The local tier is a map of event id to the unix timestamp it was
//! handled at, pruned every scheduler tick. The shared tier is a key/value
//! store with per-key expiry that survives restarts and is visible to every
//! poller instance. Both tiers retain entries for twice the window.
//!
//! Tiers are checked independently. A hit in the shared tier is not copied
//! back into the local tier.

mod redis_store;

pub use redis_store::RedisStore;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::PollerResult;

/// In-memory local tier
pub type MemoryStore = HashMap<String, i64>;

/// Process-local record of handled events
pub trait LocalStore: Send {
    fn last_seen(&self, event_id: &str) -> Option<i64>;

    fn record(&mut self, event_id: &str, timestamp: i64);

    /// Drop entries older than `threshold`, returning how many went.
    fn evict_older_than(&mut self, threshold: i64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn last_seen(&self, event_id: &str) -> Option<i64> {
        self.get(event_id).copied()
    }

    fn record(&mut self, event_id: &str, timestamp: i64) {
        self.insert(event_id.to_string(), timestamp);
    }

    fn evict_older_than(&mut self, threshold: i64) -> usize {
        let before = self.len();
        self.retain(|_, seen_at| *seen_at >= threshold);
        before - self.len()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// Store shared across poller instances, with per-key expiry
#[async_trait]
pub trait SharedStore: Send + Sync {
    async fn contains(&self, key: &str) -> PollerResult<bool>;

    async fn mark(&self, key: &str, ttl_secs: u64) -> PollerResult<()>;
}

pub struct DedupCache {
    local: Box<dyn LocalStore>,
    shared: Box<dyn SharedStore>,
    key_prefix: String,
    window_secs: u64,
}

impl DedupCache {
    pub fn new(
        local: impl LocalStore + 'static,
        shared: impl SharedStore + 'static,
        key_prefix: impl Into<String>,
        window_secs: u64,
    ) -> Self {
        Self {
            local: Box::new(local),
            shared: Box::new(shared),
            key_prefix: key_prefix.into(),
            window_secs,
        }
    }

    /// Shared-tier key for an event
    pub fn key(&self, event_id: &str) -> String {
        format!("{}/{}", self.key_prefix, event_id)
    }

    /// How long either tier keeps an entry
    pub fn retention_secs(&self) -> u64 {
        self.window_secs.saturating_mul(2)
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    pub fn local(&self) -> &dyn LocalStore {
        self.local.as_ref()
    }

    pub async fn seen(&self, event_id: &str) -> PollerResult<bool> {
        if self.local.last_seen(event_id).is_some() {
            return Ok(true);
        }

        self.shared.contains(&self.key(event_id)).await
    }

    /// Record an event as handled in both tiers.
    pub async fn mark_seen(&mut self, event_id: &str, now: i64) -> PollerResult<()> {
        self.local.record(event_id, now);
        self.shared
            .mark(&self.key(event_id), self.retention_secs())
            .await
    }

    /// Prune the local tier. Entries exactly at the threshold stay.
    pub fn evict(&mut self, now: i64) -> usize {
        let threshold = now - self.retention_secs() as i64;
        self.local.evict_older_than(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingSharedStore, MemorySharedStore};

    fn cache_with(local: MemoryStore, window: u64) -> (DedupCache, MemorySharedStore) {
        let shared = MemorySharedStore::default();
        let cache = DedupCache::new(local, shared.clone(), "stuff/event", window);
        (cache, shared)
    }

    #[tokio::test]
    async fn test_mark_seen_writes_both_tiers() {
        let (mut cache, shared) = cache_with(MemoryStore::new(), 10);

        assert!(!cache.seen("meow").await.unwrap());
        cache.mark_seen("meow", 7).await.unwrap();

        assert_eq!(cache.local().last_seen("meow"), Some(7));
        assert_eq!(shared.ttl("stuff/event/meow"), Some(20));
        assert_eq!(shared.len(), 1);
        assert!(cache.seen("meow").await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_seen_twice_is_harmless() {
        let (mut cache, shared) = cache_with(MemoryStore::new(), 10);

        cache.mark_seen("meow", 7).await.unwrap();
        cache.mark_seen("meow", 8).await.unwrap();

        assert!(cache.seen("meow").await.unwrap());
        assert_eq!(cache.local().last_seen("meow"), Some(8));
        assert_eq!(shared.len(), 1);
    }

    #[tokio::test]
    async fn test_shared_hit_is_not_promoted() {
        let shared = MemorySharedStore::default();
        let mut writer = DedupCache::new(MemoryStore::new(), shared.clone(), "stuff/event", 10);
        writer.mark_seen("meow", 7).await.unwrap();

        // fresh instance, empty local tier
        let reader = DedupCache::new(MemoryStore::new(), shared, "stuff/event", 10);
        assert!(reader.seen("meow").await.unwrap());
        assert!(reader.local().is_empty());
    }

    #[test]
    fn test_evict_drops_entries_past_threshold() {
        let local = MemoryStore::from([("stay".to_string(), 3), ("go".to_string(), 2)]);
        let (mut cache, _) = cache_with(local, 2);

        assert_eq!(cache.evict(7), 1);

        assert_eq!(cache.local().len(), 1);
        assert_eq!(cache.local().last_seen("stay"), Some(3));
        assert_eq!(cache.local().last_seen("go"), None);
    }

    #[test]
    fn test_evict_boundary_is_retention_window() {
        let window = 30;
        let now = 1_000;
        let local = MemoryStore::from([
            ("exact".to_string(), now - 2 * window),
            ("older".to_string(), now - 2 * window - 1),
            ("fresh".to_string(), now),
        ]);
        let (mut cache, _) = cache_with(local, window as u64);

        cache.evict(now);

        assert_eq!(cache.local().last_seen("exact"), Some(now - 2 * window));
        assert_eq!(cache.local().last_seen("older"), None);
        assert_eq!(cache.local().last_seen("fresh"), Some(now));
    }

    #[tokio::test]
    async fn test_evict_leaves_shared_tier_alone() {
        let (mut cache, shared) = cache_with(MemoryStore::new(), 2);
        cache.mark_seen("old", 0).await.unwrap();

        cache.evict(100);

        assert!(cache.local().is_empty());
        assert_eq!(shared.ttl("stuff/event/old"), Some(4));
        assert!(cache.seen("old").await.unwrap());
    }

    #[tokio::test]
    async fn test_backend_failure_is_an_error() {
        let mut cache = DedupCache::new(MemoryStore::new(), FailingSharedStore, "stuff/event", 10);

        let err = cache.seen("meow").await.unwrap_err();
        assert!(err.is_fatal());

        let err = cache.mark_seen("meow", 7).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_local_hit_skips_backend() {
        let local = MemoryStore::from([("meow".to_string(), 7)]);
        let cache = DedupCache::new(local, FailingSharedStore, "stuff/event", 10);

        assert!(cache.seen("meow").await.unwrap());
    }
}
