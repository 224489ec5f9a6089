//! Authorization cache - Read-through roles and permissions.
//!
//! Every authorized request resolves the caller's roles or permission set;
//! this service answers from the distributed cache and falls back to the
//! database on a miss, storing the result under a per-identity key with the
//! default TTL.
//!
//! Staleness contract: there is no invalidation hook anywhere in the system.
//! A role or permission change becomes visible only when the TTL expires, so
//! the staleness window equals the configured TTL. Concurrent misses for one
//! identity each hit the database and overwrite the same key; last write wins.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{AuthorizationReader, CacheStore, UserRoles};

/// Read-through cache over the authorization queries.
pub struct AuthorizationCache {
    cache: Arc<dyn CacheStore>,
    reader: Arc<dyn AuthorizationReader>,
    ttl: Duration,
}

impl AuthorizationCache {
    /// Creates the service with the entry TTL to apply on fills.
    pub fn new(cache: Arc<dyn CacheStore>, reader: Arc<dyn AuthorizationReader>, ttl: Duration) -> Self {
        Self { cache, reader, ttl }
    }

    fn roles_key(identity_id: &str) -> String {
        format!("auth:roles-{}", identity_id)
    }

    fn permissions_key(identity_id: &str) -> String {
        format!("auth:permissions-{}", identity_id)
    }

    /// Returns the user's id and roles for an authenticated identity.
    ///
    /// Cache hit returns the stored value; miss queries the database, caches
    /// the result, and returns it. An identity with no matching user is a
    /// non-recoverable `UserNotFound`.
    pub async fn roles_for_user(&self, identity_id: &str) -> Result<UserRoles, DomainError> {
        let key = Self::roles_key(identity_id);

        if let Some(cached) = self.read_cached(&key).await? {
            return Ok(cached);
        }

        let roles = self.reader.roles_for_identity(identity_id).await?;
        self.write_cached(&key, &roles).await?;

        Ok(roles)
    }

    /// Returns the permission names flattened across all the user's roles.
    pub async fn permissions_for_user(
        &self,
        identity_id: &str,
    ) -> Result<HashSet<String>, DomainError> {
        let key = Self::permissions_key(identity_id);

        if let Some(cached) = self.read_cached(&key).await? {
            return Ok(cached);
        }

        let permissions = self.reader.permissions_for_identity(identity_id).await?;
        self.write_cached(&key, &permissions).await?;

        Ok(permissions)
    }

    /// A permission check is pure set membership; absence is a deny with no
    /// distinction from an unknown permission name.
    pub async fn has_permission(
        &self,
        identity_id: &str,
        permission: &str,
    ) -> Result<bool, DomainError> {
        Ok(self
            .permissions_for_user(identity_id)
            .await?
            .contains(permission))
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DomainError> {
        let Some(bytes) = self.cache.get(key).await? else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::SerializationError,
                    format!("Cached value is not decodable: {}", e),
                )
                .with_detail("key", key)
            })
    }

    async fn write_cached<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Value is not encodable: {}", e),
            )
            .with_detail("key", key)
        })?;

        self.cache.set(key, bytes, self.ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCacheStore;
    use crate::domain::user::{permissions, Role};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingReader {
        user_id: Uuid,
        roles_queries: AtomicUsize,
        permissions_queries: AtomicUsize,
        known_identity: String,
    }

    impl CountingReader {
        fn new(known_identity: &str) -> Self {
            Self {
                user_id: Uuid::new_v4(),
                roles_queries: AtomicUsize::new(0),
                permissions_queries: AtomicUsize::new(0),
                known_identity: known_identity.to_string(),
            }
        }
    }

    #[async_trait]
    impl AuthorizationReader for CountingReader {
        async fn roles_for_identity(&self, identity_id: &str) -> Result<UserRoles, DomainError> {
            self.roles_queries.fetch_add(1, Ordering::SeqCst);
            if identity_id != self.known_identity {
                return Err(DomainError::new(ErrorCode::UserNotFound, "No user matches"));
            }
            Ok(UserRoles {
                user_id: self.user_id,
                roles: vec![Role::registered()],
            })
        }

        async fn permissions_for_identity(
            &self,
            identity_id: &str,
        ) -> Result<HashSet<String>, DomainError> {
            self.permissions_queries.fetch_add(1, Ordering::SeqCst);
            if identity_id != self.known_identity {
                return Err(DomainError::new(ErrorCode::UserNotFound, "No user matches"));
            }
            Ok(HashSet::from([permissions::USERS_READ_SELF.to_string()]))
        }
    }

    fn service(reader: Arc<CountingReader>, ttl: Duration) -> AuthorizationCache {
        AuthorizationCache::new(Arc::new(InMemoryCacheStore::new()), reader, ttl)
    }

    #[tokio::test]
    async fn cold_cache_queries_once_then_serves_hits() {
        let reader = Arc::new(CountingReader::new("identity-1"));
        let cache = service(reader.clone(), Duration::from_secs(60));

        let first = cache.permissions_for_user("identity-1").await.unwrap();
        let second = cache.permissions_for_user("identity-1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(reader.permissions_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn roles_and_permissions_cache_independently() {
        let reader = Arc::new(CountingReader::new("identity-1"));
        let cache = service(reader.clone(), Duration::from_secs(60));

        cache.roles_for_user("identity-1").await.unwrap();
        cache.permissions_for_user("identity-1").await.unwrap();
        cache.roles_for_user("identity-1").await.unwrap();

        assert_eq!(reader.roles_queries.load(Ordering::SeqCst), 1);
        assert_eq!(reader.permissions_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_fall_back_to_the_database() {
        let reader = Arc::new(CountingReader::new("identity-1"));
        let cache = service(reader.clone(), Duration::from_millis(20));

        cache.permissions_for_user("identity-1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.permissions_for_user("identity-1").await.unwrap();

        assert_eq!(reader.permissions_queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_identity_is_not_cached() {
        let reader = Arc::new(CountingReader::new("identity-1"));
        let cache = service(reader.clone(), Duration::from_secs(60));

        let err = cache.roles_for_user("stranger").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);

        // The failure was not cached; a retry queries again.
        let _ = cache.roles_for_user("stranger").await;
        assert_eq!(reader.roles_queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn has_permission_is_set_membership() {
        let reader = Arc::new(CountingReader::new("identity-1"));
        let cache = service(reader, Duration::from_secs(60));

        assert!(cache
            .has_permission("identity-1", permissions::USERS_READ_SELF)
            .await
            .unwrap());
        assert!(!cache
            .has_permission("identity-1", permissions::USERS_DELETE)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn corrupt_cache_bytes_surface_as_serialization_errors() {
        let reader = Arc::new(CountingReader::new("identity-1"));
        let store = Arc::new(InMemoryCacheStore::new());
        store
            .set(
                &AuthorizationCache::roles_key("identity-1"),
                b"not json".to_vec(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let cache = AuthorizationCache::new(store, reader, Duration::from_secs(60));
        let err = cache.roles_for_user("identity-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }
}
