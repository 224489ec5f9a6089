//! PostgreSQL implementation of BlogRepository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::blog::{Blog, BlogStatus};
use crate::domain::foundation::{BlogId, DomainError, TagId, Timestamp, UserId};
use crate::ports::{BlogRepository, Clock};

use super::{map_db_err, UnitOfWork};

/// PostgreSQL implementation of [`BlogRepository`].
#[derive(Clone)]
pub struct PostgresBlogRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresBlogRepository {
    /// Creates a new repository on the given connection pool.
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl BlogRepository for PostgresBlogRepository {
    async fn add(&self, blog: &mut Blog) -> Result<(), DomainError> {
        let mut uow = UnitOfWork::begin(&self.pool, self.clock.clone()).await?;

        sqlx::query(
            r#"
            INSERT INTO blogs (id, user_id, title, content, summary, status, published_at_utc, updated_at_utc, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(blog.id().as_uuid())
        .bind(blog.user_id().as_uuid())
        .bind(blog.title())
        .bind(blog.content())
        .bind(blog.summary())
        .bind(blog.status().as_str())
        .bind(blog.published_at().as_datetime())
        .bind(blog.updated_at().map(|ts| *ts.as_datetime()))
        .bind(blog.version())
        .execute(uow.conn())
        .await
        .map_err(|e| map_db_err("Failed to insert blog", e))?;

        for tag_id in blog.tag_ids() {
            sqlx::query("INSERT INTO blog_tags (blog_id, tag_id) VALUES ($1, $2)")
                .bind(blog.id().as_uuid())
                .bind(tag_id.as_uuid())
                .execute(uow.conn())
                .await
                .map_err(|e| map_db_err("Failed to insert blog tag link", e))?;
        }

        uow.stage_events(blog);
        uow.commit().await
    }

    async fn find_by_id(&self, id: BlogId) -> Result<Option<Blog>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, content, summary, status, published_at_utc, updated_at_utc, version
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch blog", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tag_rows = sqlx::query("SELECT tag_id FROM blog_tags WHERE blog_id = $1")
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err("Failed to fetch blog tag links", e))?;

        let read = |e: sqlx::Error| map_db_err("Failed to read blog row", e);

        let tag_ids = tag_rows
            .into_iter()
            .map(|r| Ok(TagId::from_uuid(r.try_get::<Uuid, _>("tag_id").map_err(read)?)))
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Some(Blog::from_storage(
            BlogId::from_uuid(row.try_get("id").map_err(read)?),
            UserId::from_uuid(row.try_get("user_id").map_err(read)?),
            row.try_get("title").map_err(read)?,
            row.try_get("content").map_err(read)?,
            row.try_get("summary").map_err(read)?,
            BlogStatus::parse(&row.try_get::<String, _>("status").map_err(read)?)?,
            Timestamp::from_datetime(row.try_get::<DateTime<Utc>, _>("published_at_utc").map_err(read)?),
            row.try_get::<Option<DateTime<Utc>>, _>("updated_at_utc")
                .map_err(read)?
                .map(Timestamp::from_datetime),
            tag_ids,
            row.try_get("version").map_err(read)?,
        )))
    }
}
