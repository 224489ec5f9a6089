//! CacheStore port - Distributed cache access.
//!
//! Values are opaque byte strings; callers own (de)serialization. Every entry
//! carries a TTL - the cache has no explicit invalidation hook anywhere in
//! the system, so TTL expiry is the only bound on staleness.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::DomainError;

/// Port for a shared external cache (e.g., Redis).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the cached bytes for `key`, or `None` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// Concurrent writers of the same key race; last write wins.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), DomainError>;

    /// Removes `key` if present.
    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}
