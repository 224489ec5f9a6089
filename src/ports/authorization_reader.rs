//! AuthorizationReader port - Database fallback for authorization lookups.
//!
//! The authorization cache consults this port on a cache miss. Both queries
//! key on the external identity id, not the internal user id, because the
//! caller only holds the authenticated principal's identity claim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::domain::user::Role;

/// A user's id and roles, as resolved for an external identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoles {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

/// Port for resolving roles and permissions from the source of truth.
#[async_trait]
pub trait AuthorizationReader: Send + Sync {
    /// Resolves the roles held by the user with this identity.
    ///
    /// Fails with `UserNotFound` if no user matches; exactly one match is
    /// assumed.
    async fn roles_for_identity(&self, identity_id: &str) -> Result<UserRoles, DomainError>;

    /// Resolves the permission names flattened across all of the user's roles.
    ///
    /// Fails with `UserNotFound` if no user matches.
    async fn permissions_for_identity(
        &self,
        identity_id: &str,
    ) -> Result<HashSet<String>, DomainError>;
}
