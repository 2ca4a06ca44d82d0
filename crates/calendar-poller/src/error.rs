//! Error type for the poll pipeline.
//!
//! Cache backend failures are fatal: the dedup guarantee cannot be kept
//! without them, so they end the scheduler. Everything else is scoped to
//! a single event or a single poll cycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollerError {
    /// Redis command failed
    #[error("Cache backend error: {0}")]
    Cache(#[from] redis::RedisError),

    /// No Redis connection could be checked out
    #[error("Cache connection error")]
    CachePool(#[source] deadpool_redis::PoolError),

    /// Chore API answered with a non-success status
    #[error("Chore API returned {status} for {method} {url}")]
    Dispatch {
        method: &'static str,
        url: String,
        status: reqwest::StatusCode,
    },

    /// Chore API request never got a response
    #[error("Chore API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Calendar lookup or listing failed
    #[error("Calendar error: {0:#}")]
    Calendar(#[from] anyhow::Error),
}

impl PollerError {
    /// Whether the scheduler must stop instead of moving on
    pub fn is_fatal(&self) -> bool {
        matches!(self, PollerError::Cache(_) | PollerError::CachePool(_))
    }
}

impl From<deadpool_redis::PoolError> for PollerError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        PollerError::CachePool(err)
    }
}

pub type PollerResult<T> = Result<T, PollerError>;
