//! Redis-backed cache store for production deployments.
//!
//! Entries are written with `SET ... EX`, so expiry is enforced server-side
//! and shared across all process instances.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::CacheStore;

/// Redis implementation of [`CacheStore`].
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
}

impl RedisCacheStore {
    /// Creates a new store on a multiplexed connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

fn cache_err(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Cache backend error: {}", e))
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(cache_err)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        // EX takes whole seconds; round up so a sub-second TTL still expires.
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, secs)
            .await
            .map_err(cache_err)
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(cache_err)
    }
}
