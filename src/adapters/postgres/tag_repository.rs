//! PostgreSQL implementation of TagRepository.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, TagId, UserId};
use crate::domain::tag::{Tag, TagName};
use crate::ports::{Clock, TagRepository};

use super::{map_db_err, UnitOfWork};

/// PostgreSQL implementation of [`TagRepository`].
///
/// Tags raise no events; saves still run through the unit of work so the
/// zero-event path stays a no-op outbox insert rather than a special case.
#[derive(Clone)]
pub struct PostgresTagRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresTagRepository {
    /// Creates a new repository on the given connection pool.
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn add(&self, tag: &mut Tag) -> Result<(), DomainError> {
        let mut uow = UnitOfWork::begin(&self.pool, self.clock.clone()).await?;

        sqlx::query(
            r#"
            INSERT INTO tags (id, user_id, name, description, version)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(tag.id().as_uuid())
        .bind(tag.user_id().as_uuid())
        .bind(tag.name().as_str())
        .bind(tag.description())
        .bind(tag.version())
        .execute(uow.conn())
        .await
        .map_err(|e| map_db_err("Failed to insert tag", e))?;

        uow.stage_events(tag);
        uow.commit().await
    }

    async fn update(&self, tag: &mut Tag) -> Result<(), DomainError> {
        let mut uow = UnitOfWork::begin(&self.pool, self.clock.clone()).await?;

        let result = sqlx::query(
            r#"
            UPDATE tags
            SET name = $2,
                description = $3,
                version = version + 1
            WHERE id = $1 AND version = $4
            "#,
        )
        .bind(tag.id().as_uuid())
        .bind(tag.name().as_str())
        .bind(tag.description())
        .bind(tag.version())
        .execute(uow.conn())
        .await
        .map_err(|e| map_db_err("Failed to update tag", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!("Tag {} was modified concurrently", tag.id()),
            ));
        }

        uow.stage_events(tag);
        uow.commit().await
    }

    async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>, DomainError> {
        let row = sqlx::query(
            "SELECT id, user_id, name, description, version FROM tags WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch tag", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let read = |e: sqlx::Error| map_db_err("Failed to read tag row", e);

        Ok(Some(Tag::from_storage(
            TagId::from_uuid(row.try_get("id").map_err(read)?),
            UserId::from_uuid(row.try_get("user_id").map_err(read)?),
            TagName::new(row.try_get::<String, _>("name").map_err(read)?)?,
            row.try_get("description").map_err(read)?,
            row.try_get("version").map_err(read)?,
        )))
    }
}
