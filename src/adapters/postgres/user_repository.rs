//! PostgreSQL implementation of UserRepository.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::{Email, FirstName, LastName, Role, User};
use crate::ports::{Clock, UserRepository};

use super::{map_db_err, UnitOfWork};

/// PostgreSQL implementation of [`UserRepository`].
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresUserRepository {
    /// Creates a new repository on the given connection pool.
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn load_roles(&self, id: UserId) -> Result<Vec<Role>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch user roles", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(Role {
                    id: row
                        .try_get("id")
                        .map_err(|e| map_db_err("Failed to read role row", e))?,
                    name: row
                        .try_get("name")
                        .map_err(|e| map_db_err("Failed to read role row", e))?,
                })
            })
            .collect()
    }

    async fn hydrate(&self, row: sqlx::postgres::PgRow) -> Result<User, DomainError> {
        let read = |e: sqlx::Error| map_db_err("Failed to read user row", e);

        let id = UserId::from_uuid(row.try_get("id").map_err(read)?);
        let roles = self.load_roles(id).await?;

        Ok(User::from_storage(
            id,
            FirstName::new(row.try_get::<String, _>("first_name").map_err(read)?)?,
            LastName::new(row.try_get::<String, _>("last_name").map_err(read)?)?,
            Email::new(row.try_get::<String, _>("email").map_err(read)?)?,
            row.try_get("identity_id").map_err(read)?,
            roles,
            row.try_get("version").map_err(read)?,
        ))
    }
}

async fn insert_role_links(conn: &mut PgConnection, user: &User) -> Result<(), DomainError> {
    for role in user.roles() {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user.id().as_uuid())
            .bind(role.id)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_db_err("Failed to insert user role", e))?;
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn add(&self, user: &mut User) -> Result<(), DomainError> {
        let mut uow = UnitOfWork::begin(&self.pool, self.clock.clone()).await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, identity_id, version)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.first_name().as_str())
        .bind(user.last_name().as_str())
        .bind(user.email().as_str())
        .bind(user.identity_id())
        .bind(user.version())
        .execute(uow.conn())
        .await
        .map_err(|e| map_db_err("Failed to insert user", e))?;

        insert_role_links(uow.conn(), user).await?;

        uow.stage_events(user);
        uow.commit().await
    }

    async fn update(&self, user: &mut User) -> Result<(), DomainError> {
        let mut uow = UnitOfWork::begin(&self.pool, self.clock.clone()).await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                email = $4,
                identity_id = $5,
                version = version + 1
            WHERE id = $1 AND version = $6
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.first_name().as_str())
        .bind(user.last_name().as_str())
        .bind(user.email().as_str())
        .bind(user.identity_id())
        .bind(user.version())
        .execute(uow.conn())
        .await
        .map_err(|e| map_db_err("Failed to update user", e))?;

        // Zero rows means the persisted version moved on under us; dropping
        // the unit of work rolls everything back.
        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!("User {} was modified concurrently", user.id()),
            ));
        }

        uow.stage_events(user);
        uow.commit().await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, identity_id, version FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch user", e))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_identity_id(&self, identity_id: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, identity_id, version FROM users WHERE identity_id = $1",
        )
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch user by identity", e))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }
}
