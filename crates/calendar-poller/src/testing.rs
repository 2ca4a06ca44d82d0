//! In-memory collaborators for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::CalendarEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::SharedStore;
use crate::error::{PollerError, PollerResult};
use crate::poller::EventSource;

/// Shared tier that remembers the TTL each key was written with
#[derive(Clone, Default)]
pub struct MemorySharedStore {
    entries: Arc<Mutex<HashMap<String, u64>>>,
}

impl MemorySharedStore {
    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.entries.lock().unwrap().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl SharedStore for MemorySharedStore {
    async fn contains(&self, key: &str) -> PollerResult<bool> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn mark(&self, key: &str, ttl_secs: u64) -> PollerResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), ttl_secs);
        Ok(())
    }
}

/// Shared tier whose backend is down
pub struct FailingSharedStore;

fn backend_down() -> PollerError {
    PollerError::from(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection refused",
    )))
}

#[async_trait]
impl SharedStore for FailingSharedStore {
    async fn contains(&self, _key: &str) -> PollerResult<bool> {
        Err(backend_down())
    }

    async fn mark(&self, _key: &str, _ttl_secs: u64) -> PollerResult<()> {
        Err(backend_down())
    }
}

/// Calendar returning a fixed event list and recording each query window
#[derive(Clone, Default)]
pub struct ScriptedSource {
    events: Vec<CalendarEvent>,
    queries: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>>,
    fail: bool,
}

impl ScriptedSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> PollerResult<Vec<CalendarEvent>> {
        self.queries.lock().unwrap().push((time_min, time_max));
        if self.fail {
            return Err(anyhow::anyhow!("calendar unavailable").into());
        }
        Ok(self.events.clone())
    }
}
