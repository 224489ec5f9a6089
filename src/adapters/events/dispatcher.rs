//! Outbox dispatcher - Scheduled delivery of persisted domain events.
//!
//! Runs independently of any request: on a fixed interval it claims a batch
//! of pending outbox messages, publishes each to the in-process subscribers,
//! and records the outcome per message inside the claim's transaction.
//!
//! Failure semantics:
//! - A handler (or deserialization) failure is terminal for that message: the
//!   error text is recorded, the message is marked processed, and the rest of
//!   the batch continues. There is no redelivery of failed messages.
//! - A claim/transaction failure rolls the whole batch back; the messages
//!   stay pending and the next tick retries them. A crash between publish and
//!   commit therefore re-delivers - at-least-once is the contract.
//! - Shutdown abandons the in-flight batch uncommitted; pending rows remain
//!   pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::config::OutboxConfig;
use crate::domain::foundation::DomainError;
use crate::ports::{Clock, EventPublisher, OutboxClaim, OutboxMessage, OutboxStore};

/// Outcome of one dispatcher batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Messages claimed this run.
    pub claimed: usize,

    /// Messages published without a handler failure.
    pub succeeded: usize,

    /// Messages marked processed with an error recorded.
    pub failed: usize,
}

/// Scheduled worker that drains the outbox.
pub struct OutboxDispatcher {
    store: Arc<dyn OutboxStore>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: OutboxConfig,
}

impl OutboxDispatcher {
    /// Creates a dispatcher over the given store and subscriber registry.
    pub fn new(
        store: Arc<dyn OutboxStore>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: OutboxConfig,
    ) -> Self {
        Self {
            store,
            publisher,
            clock,
            config,
        }
    }

    /// Runs the dispatch loop until the shutdown signal fires.
    ///
    /// A batch in flight when shutdown arrives is abandoned: its claim is
    /// dropped uncommitted and the rows stay pending for the next process.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(Duration::from_secs(self.config.interval_in_seconds));

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Outbox dispatcher stopping");
                        return;
                    }
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                tracing::info!("Outbox dispatcher stopping mid-batch");
                                return;
                            }
                        }
                        result = self.process_batch() => match result {
                            Ok(outcome) if outcome.claimed > 0 => {
                                tracing::info!(
                                    claimed = outcome.claimed,
                                    succeeded = outcome.succeeded,
                                    failed = outcome.failed,
                                    "Completed processing outbox messages"
                                );
                            }
                            Ok(_) => {}
                            Err(error) => {
                                // Nothing committed; every claimed row is
                                // still pending for the next tick.
                                tracing::error!(%error, "Outbox batch failed");
                            }
                        }
                    }
                }
            }
        }
    }

    /// Claims and processes one batch. Exposed for tests and manual drains.
    pub async fn process_batch(&self) -> Result<BatchOutcome, DomainError> {
        let mut claim = self.store.claim_pending(self.config.batch_size).await?;
        let messages = claim.messages().to_vec();

        let mut outcome = BatchOutcome {
            claimed: messages.len(),
            ..BatchOutcome::default()
        };

        for message in &messages {
            let error = match self.publish_message(message).await {
                Ok(()) => {
                    outcome.succeeded += 1;
                    None
                }
                Err(e) => {
                    tracing::error!(
                        message_id = %message.id,
                        event_type = %message.event_type,
                        error = %e,
                        "Exception while processing outbox message"
                    );
                    outcome.failed += 1;
                    Some(e.to_string())
                }
            };

            claim
                .mark_processed(message.id, self.clock.now(), error)
                .await?;
        }

        claim.commit().await?;
        Ok(outcome)
    }

    /// Decodes one message and publishes it to every subscriber of its type.
    async fn publish_message(&self, message: &OutboxMessage) -> Result<(), DomainError> {
        let envelope = message.envelope()?;
        self.publisher.publish(envelope).await
    }
}
