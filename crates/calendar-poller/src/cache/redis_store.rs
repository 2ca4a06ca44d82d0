//! Redis-backed shared tier.

use async_trait::async_trait;
use deadpool_redis::{Config, CreatePoolError, Pool, Runtime};
use redis::AsyncCommands;

use super::SharedStore;
use crate::error::PollerResult;

#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool for `redis://{host}:{port}`. Connections are opened lazily.
    pub fn connect(host: &str, port: u16) -> Result<Self, CreatePoolError> {
        let config = Config::from_url(format!("redis://{}:{}", host, port));
        let pool = config.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn contains(&self, key: &str) -> PollerResult<bool> {
        let mut conn = self.pool.get().await?;
        let marker: Option<String> = conn.get(key).await?;
        tracing::debug!(key = %key, hit = marker.is_some(), "shared cache lookup");
        Ok(marker.is_some())
    }

    async fn mark(&self, key: &str, ttl_secs: u64) -> PollerResult<()> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, true, ttl_secs).await?;
        tracing::debug!(key = %key, ttl_secs = %ttl_secs, "shared cache set");
        Ok(())
    }
}
