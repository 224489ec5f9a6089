//! UserRepository port.
//!
//! Mutating operations take the aggregate mutably: the implementation drains
//! the aggregate's buffered events and persists them as outbox messages in
//! the same transaction as the row changes. A committed save therefore never
//! loses its events, and a failed save rolls both back together.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::User;

/// Port for persisting user aggregates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user, their role links, and their buffered events
    /// atomically.
    async fn add(&self, user: &mut User) -> Result<(), DomainError>;

    /// Updates an existing user with an optimistic version check.
    ///
    /// Fails with `ConcurrencyConflict` if the persisted version no longer
    /// matches the aggregate's.
    async fn update(&self, user: &mut User) -> Result<(), DomainError>;

    /// Loads a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Loads a user by external identity id.
    async fn find_by_identity_id(&self, identity_id: &str) -> Result<Option<User>, DomainError>;
}
