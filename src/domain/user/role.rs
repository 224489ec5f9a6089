//! Roles and permissions.
//!
//! Roles and permissions are a fixed, database-seeded vocabulary. The
//! constants here mirror the seed migration; `Role::from_name` is the only
//! way to obtain a role from external input.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// A role a user can hold, granting a set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

impl Role {
    /// Default role for self-registered users.
    pub fn registered() -> Self {
        Self {
            id: 1,
            name: "Registered".to_string(),
        }
    }

    /// Administrative role with the full permission set.
    pub fn super_admin() -> Self {
        Self {
            id: 2,
            name: "SuperAdmin".to_string(),
        }
    }

    /// Looks up a predefined role by name.
    ///
    /// Fails with `RoleInvalid` for names outside the seeded vocabulary.
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        ALL_ROLES
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(ErrorCode::RoleInvalid, "The role is invalid")
                    .with_detail("role", name)
            })
    }
}

static ALL_ROLES: Lazy<Vec<Role>> = Lazy::new(|| vec![Role::registered(), Role::super_admin()]);

/// Permission names, as stored in the `permissions` table.
pub mod permissions {
    pub const USERS_READ_SELF: &str = "users:read-self";
    pub const USERS_READ: &str = "users:read";
    pub const USERS_READ_SINGLE: &str = "users:read-single";
    pub const USERS_UPDATE: &str = "users:update";
    pub const USERS_DELETE: &str = "users:delete";
}
