//! Transactional unit of work.
//!
//! Wraps one database transaction and carries the outbox write: repositories
//! execute their statements on [`UnitOfWork::conn`], stage the aggregate's
//! buffered events with [`UnitOfWork::stage_events`], and [`UnitOfWork::commit`]
//! inserts the staged outbox rows before committing. No event is ever
//! recorded for a change that did not commit, and no committed change loses
//! its events.

use std::sync::Arc;

use sqlx::postgres::{PgConnection, Postgres};
use sqlx::{PgPool, Transaction};

use crate::domain::foundation::{Aggregate, DomainError};
use crate::ports::{Clock, OutboxMessage};

use super::map_db_err;

/// One atomic save spanning aggregate rows and their outbox messages.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
    clock: Arc<dyn Clock>,
    staged: Vec<OutboxMessage>,
}

impl UnitOfWork {
    /// Opens a new transaction on the pool.
    pub async fn begin(pool: &PgPool, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| map_db_err("Failed to begin transaction", e))?;

        Ok(Self {
            tx,
            clock,
            staged: Vec::new(),
        })
    }

    /// The transaction's connection, for repository statements.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Drains the aggregate's buffered events into staged outbox messages.
    ///
    /// Each message gets a fresh id and the clock's current UTC time. The
    /// aggregate's buffer is cleared, so a retried save cannot re-emit.
    /// Staging an aggregate with no buffered events is a no-op.
    pub fn stage_events(&mut self, aggregate: &mut dyn Aggregate) {
        let now = self.clock.now();
        for envelope in aggregate.pull_domain_events() {
            self.staged.push(OutboxMessage::from_envelope(&envelope, now));
        }
    }

    /// Inserts all staged outbox rows and commits the transaction.
    ///
    /// On failure everything rolls back together; unique-constraint and
    /// serialization failures surface as their distinguished error codes.
    pub async fn commit(mut self) -> Result<(), DomainError> {
        for message in &self.staged {
            sqlx::query(
                r#"
                INSERT INTO outbox_messages (id, occurred_on_utc, type, content)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(message.id)
            .bind(message.occurred_on_utc.as_datetime())
            .bind(&message.event_type)
            .bind(&message.content)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_err("Failed to insert outbox message", e))?;
        }

        self.tx
            .commit()
            .await
            .map_err(|e| map_db_err("Failed to commit unit of work", e))
    }
}
