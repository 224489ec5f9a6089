//! PostgreSQL implementation of the outbox store.
//!
//! The claim query is the concurrency-safety mechanism for multi-instance
//! deployments: `FOR UPDATE SKIP LOCKED` locks the selected rows for this
//! transaction and skips rows already locked by a concurrent claimant, so
//! dispatcher runs never block each other or double-claim.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow, Postgres};
use sqlx::{Row, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{OutboxClaim, OutboxMessage, OutboxStore};

use super::map_db_err;

/// PostgreSQL implementation of [`OutboxStore`].
#[derive(Clone)]
pub struct PostgresOutboxStore {
    pool: PgPool,
}

impl PostgresOutboxStore {
    /// Creates a new store on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn claim_pending(&self, batch_size: u32) -> Result<Box<dyn OutboxClaim>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin claim transaction", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, occurred_on_utc, type, content, processed_on_utc, error
            FROM outbox_messages
            WHERE processed_on_utc IS NULL
            ORDER BY occurred_on_utc
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(i64::from(batch_size))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_db_err("Failed to claim outbox messages", e))?;

        let messages = rows
            .into_iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(PostgresOutboxClaim { tx, messages }))
    }
}

/// Rows held under row locks until the claim's transaction ends.
///
/// Dropping the claim without committing rolls the transaction back, which
/// releases the locks and leaves every row pending.
struct PostgresOutboxClaim {
    tx: Transaction<'static, Postgres>,
    messages: Vec<OutboxMessage>,
}

#[async_trait]
impl OutboxClaim for PostgresOutboxClaim {
    fn messages(&self) -> &[OutboxMessage] {
        &self.messages
    }

    async fn mark_processed(
        &mut self,
        id: Uuid,
        processed_on_utc: Timestamp,
        error: Option<String>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE outbox_messages
            SET processed_on_utc = $2,
                error = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(processed_on_utc.as_datetime())
        .bind(error)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_db_err("Failed to mark outbox message processed", e))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_err("Failed to commit outbox claim", e))
    }
}

fn row_to_message(row: PgRow) -> Result<OutboxMessage, DomainError> {
    let read = |e: sqlx::Error| map_db_err("Failed to read outbox row", e);

    Ok(OutboxMessage {
        id: row.try_get("id").map_err(read)?,
        occurred_on_utc: Timestamp::from_datetime(
            row.try_get::<DateTime<Utc>, _>("occurred_on_utc").map_err(read)?,
        ),
        event_type: row.try_get("type").map_err(read)?,
        content: row.try_get("content").map_err(read)?,
        processed_on_utc: row
            .try_get::<Option<DateTime<Utc>>, _>("processed_on_utc")
            .map_err(read)?
            .map(Timestamp::from_datetime),
        error: row.try_get("error").map_err(read)?,
    })
}
