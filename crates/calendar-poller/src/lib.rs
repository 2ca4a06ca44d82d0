//! Calendar poller: turns YAML instructions embedded in calendar event
//! descriptions into chore API calls, at most once per event per window.

pub mod actions;
pub mod cache;
pub mod calendar_client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod poller;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use cache::{DedupCache, LocalStore, MemoryStore, RedisStore, SharedStore};
pub use calendar_client::CalendarClient;
pub use config::PollerConfig;
pub use dispatcher::ChoreClient;
pub use error::{PollerError, PollerResult};
pub use poller::{EventSource, PollSummary, Poller};
pub use scheduler::PollingScheduler;
