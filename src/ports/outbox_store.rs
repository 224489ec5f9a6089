//! OutboxStore port - Transactional persistence for domain events.
//!
//! This port implements the storage half of the Transactional Outbox Pattern:
//!
//! 1. The unit of work converts buffered domain events into outbox messages
//!    and inserts them in the same transaction as the aggregate changes.
//! 2. The dispatcher periodically claims a batch of pending messages,
//!    publishes each one to the in-process subscribers, and records the
//!    outcome per message.
//!
//! The claim contract is the concurrency-safety mechanism: claimed messages
//! are held exclusively until the claim is committed or dropped, and claiming
//! never blocks on messages held by a concurrent claimant. PostgreSQL
//! provides this with `FOR UPDATE SKIP LOCKED`; the in-memory adapter with a
//! claimed-id set.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, Timestamp};

/// One durable record of a raised domain event awaiting dispatch.
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,

    /// When the message was staged; defines FIFO dispatch order.
    pub occurred_on_utc: Timestamp,

    /// Event type discriminator, used to route the deserialized event.
    pub event_type: String,

    /// The serialized event envelope.
    pub content: String,

    /// Set exactly once, when dispatch completes (success or failure).
    pub processed_on_utc: Option<Timestamp>,

    /// Failure diagnostics if publishing failed. A failed message is still
    /// marked processed; there is no automatic redelivery.
    pub error: Option<String>,
}

impl OutboxMessage {
    /// Builds a pending message from a drained event envelope.
    pub fn from_envelope(envelope: &EventEnvelope, occurred_on_utc: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_on_utc,
            event_type: envelope.event_type.clone(),
            content: serde_json::to_string(envelope)
                .expect("Envelope serialization should never fail"),
            processed_on_utc: None,
            error: None,
        }
    }

    /// Parses the stored content back into an event envelope.
    pub fn envelope(&self) -> Result<EventEnvelope, DomainError> {
        serde_json::from_str(&self.content).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Outbox content is not a valid envelope: {}", e),
            )
            .with_detail("message_id", self.id.to_string())
        })
    }

    /// Returns true if the message has not been dispatched yet.
    pub fn is_pending(&self) -> bool {
        self.processed_on_utc.is_none()
    }
}

/// A batch of messages held exclusively by one dispatcher run.
///
/// Marked outcomes are buffered in the claim's transaction and only become
/// visible at `commit`. Dropping a claim without committing releases the
/// messages unprocessed, so they stay pending for the next run.
#[async_trait]
pub trait OutboxClaim: Send {
    /// The claimed messages, ordered by `occurred_on_utc` ascending.
    fn messages(&self) -> &[OutboxMessage];

    /// Records the dispatch outcome for one claimed message.
    async fn mark_processed(
        &mut self,
        id: Uuid,
        processed_on_utc: Timestamp,
        error: Option<String>,
    ) -> Result<(), DomainError>;

    /// Atomically persists all recorded outcomes and releases the claim.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

/// Port for claiming pending outbox messages.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Claims up to `batch_size` pending messages, oldest first.
    ///
    /// Messages already claimed by a concurrent run are skipped, never waited
    /// on; two concurrent claims are always disjoint.
    async fn claim_pending(&self, batch_size: u32) -> Result<Box<dyn OutboxClaim>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_envelope_creates_pending_message() {
        let envelope = EventEnvelope::new("user.registered", "user-1", "User", json!({"a": 1}));
        let message = OutboxMessage::from_envelope(&envelope, Timestamp::now());

        assert!(message.is_pending());
        assert!(message.error.is_none());
        assert_eq!(message.event_type, "user.registered");
    }

    #[test]
    fn content_round_trips_to_envelope() {
        let envelope = EventEnvelope::new("user.registered", "user-1", "User", json!({"a": 1}));
        let message = OutboxMessage::from_envelope(&envelope, Timestamp::now());

        let restored = message.envelope().unwrap();
        assert_eq!(restored.event_type, envelope.event_type);
        assert_eq!(restored.event_id, envelope.event_id);
        assert_eq!(restored.payload, envelope.payload);
    }

    #[test]
    fn corrupt_content_is_a_serialization_error() {
        let envelope = EventEnvelope::new("user.registered", "user-1", "User", json!({}));
        let mut message = OutboxMessage::from_envelope(&envelope, Timestamp::now());
        message.content = "not json".to_string();

        let err = message.envelope().unwrap_err();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }
}
