//! PostgreSQL implementation of AuthorizationReader.
//!
//! These queries read the identity tables owned by the user aggregate; the
//! authorization cache is their only caller.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::Role;
use crate::ports::{AuthorizationReader, UserRoles};

use super::map_db_err;

/// PostgreSQL implementation of [`AuthorizationReader`].
#[derive(Clone)]
pub struct PostgresAuthorizationReader {
    pool: PgPool,
}

impl PostgresAuthorizationReader {
    /// Creates a new reader on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_id_for_identity(&self, identity_id: &str) -> Result<Uuid, DomainError> {
        let row = sqlx::query("SELECT id FROM users WHERE identity_id = $1")
            .bind(identity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_err("Failed to resolve identity", e))?;

        let Some(row) = row else {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                "No user matches the authenticated identity",
            )
            .with_detail("identity_id", identity_id));
        };

        row.try_get("id")
            .map_err(|e| map_db_err("Failed to read user id", e))
    }
}

#[async_trait]
impl AuthorizationReader for PostgresAuthorizationReader {
    async fn roles_for_identity(&self, identity_id: &str) -> Result<UserRoles, DomainError> {
        let user_id = self.user_id_for_identity(identity_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch roles", e))?;

        let roles = rows
            .into_iter()
            .map(|row| {
                let read = |e: sqlx::Error| map_db_err("Failed to read role row", e);
                Ok(Role {
                    id: row.try_get("id").map_err(read)?,
                    name: row.try_get("name").map_err(read)?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(UserRoles { user_id, roles })
    }

    async fn permissions_for_identity(
        &self,
        identity_id: &str,
    ) -> Result<HashSet<String>, DomainError> {
        let user_id = self.user_id_for_identity(identity_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT DISTINCT p.name
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch permissions", e))?;

        rows.into_iter()
            .map(|row| {
                row.try_get("name")
                    .map_err(|e| map_db_err("Failed to read permission row", e))
            })
            .collect()
    }
}
