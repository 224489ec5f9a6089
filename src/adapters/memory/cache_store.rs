//! In-memory cache store for testing.
//!
//! Enforces per-entry TTL with `Instant` so read-through expiry behaves like
//! the Redis adapter.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned. Acceptable for test code;
//! this adapter should NOT be used in production.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::foundation::DomainError;
use crate::ports::CacheStore;

/// In-memory implementation of [`CacheStore`].
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
}

impl InMemoryCacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (unexpired) entries.
    pub fn live_entries(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .expect("InMemoryCacheStore: lock poisoned")
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let entries = self
            .entries
            .lock()
            .expect("InMemoryCacheStore: lock poisoned");

        Ok(entries.get(key).and_then(|(value, expires_at)| {
            if *expires_at > Instant::now() {
                Some(value.clone())
            } else {
                None
            }
        }))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), DomainError> {
        self.entries
            .lock()
            .expect("InMemoryCacheStore: lock poisoned")
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.entries
            .lock()
            .expect("InMemoryCacheStore: lock poisoned")
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryCacheStore::new();
        store
            .set("k", b"value".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let store = InMemoryCacheStore::new();
        store
            .set("k", b"value".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.live_entries(), 0);
    }

    #[tokio::test]
    async fn remove_deletes_the_entry() {
        let store = InMemoryCacheStore::new();
        store
            .set("k", b"value".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_write_wins_on_overwrite() {
        let store = InMemoryCacheStore::new();
        store
            .set("k", b"first".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("k", b"second".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"second".to_vec()));
    }
}
