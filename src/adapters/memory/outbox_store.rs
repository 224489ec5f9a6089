//! In-memory outbox store for testing.
//!
//! Mirrors the PostgreSQL adapter's claim contract: a claim holds its
//! messages exclusively via a claimed-id set, skips messages held by a
//! concurrent claim, buffers `mark_processed` updates until `commit`, and
//! releases everything unprocessed when dropped uncommitted.
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned. Acceptable for test code;
//! this adapter should NOT be used in production.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{OutboxClaim, OutboxMessage, OutboxStore};

#[derive(Default)]
struct Shared {
    rows: Mutex<Vec<OutboxMessage>>,
    claimed: Mutex<HashSet<Uuid>>,
}

/// In-memory implementation of [`OutboxStore`].
#[derive(Clone, Default)]
pub struct InMemoryOutboxStore {
    shared: Arc<Shared>,
}

impl InMemoryOutboxStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a message directly, as the unit of work would.
    pub fn insert(&self, message: OutboxMessage) {
        self.shared
            .rows
            .lock()
            .expect("InMemoryOutboxStore: rows lock poisoned")
            .push(message);
    }

    /// Returns a copy of every stored message (for test assertions).
    pub fn snapshot(&self) -> Vec<OutboxMessage> {
        self.shared
            .rows
            .lock()
            .expect("InMemoryOutboxStore: rows lock poisoned")
            .clone()
    }

    /// Returns the number of messages not yet marked processed.
    pub fn pending_count(&self) -> usize {
        self.shared
            .rows
            .lock()
            .expect("InMemoryOutboxStore: rows lock poisoned")
            .iter()
            .filter(|m| m.is_pending())
            .count()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn claim_pending(&self, batch_size: u32) -> Result<Box<dyn OutboxClaim>, DomainError> {
        let rows = self
            .shared
            .rows
            .lock()
            .expect("InMemoryOutboxStore: rows lock poisoned");
        let mut claimed = self
            .shared
            .claimed
            .lock()
            .expect("InMemoryOutboxStore: claimed lock poisoned");

        let mut messages: Vec<OutboxMessage> = rows
            .iter()
            .filter(|m| m.is_pending() && !claimed.contains(&m.id))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.occurred_on_utc);
        messages.truncate(batch_size as usize);

        for message in &messages {
            claimed.insert(message.id);
        }

        Ok(Box::new(InMemoryOutboxClaim {
            shared: Arc::clone(&self.shared),
            messages,
            updates: Vec::new(),
        }))
    }
}

struct InMemoryOutboxClaim {
    shared: Arc<Shared>,
    messages: Vec<OutboxMessage>,
    updates: Vec<(Uuid, Timestamp, Option<String>)>,
}

#[async_trait]
impl OutboxClaim for InMemoryOutboxClaim {
    fn messages(&self) -> &[OutboxMessage] {
        &self.messages
    }

    async fn mark_processed(
        &mut self,
        id: Uuid,
        processed_on_utc: Timestamp,
        error: Option<String>,
    ) -> Result<(), DomainError> {
        self.updates.push((id, processed_on_utc, error));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), DomainError> {
        {
            let mut rows = self
                .shared
                .rows
                .lock()
                .expect("InMemoryOutboxStore: rows lock poisoned");
            for (id, processed_on_utc, error) in self.updates.drain(..) {
                if let Some(row) = rows.iter_mut().find(|m| m.id == id) {
                    row.processed_on_utc = Some(processed_on_utc);
                    row.error = error;
                }
            }
        }

        // Drop runs next and releases the claimed ids.
        Ok(())
    }
}

impl Drop for InMemoryOutboxClaim {
    fn drop(&mut self) {
        let mut claimed = self
            .shared
            .claimed
            .lock()
            .expect("InMemoryOutboxStore: claimed lock poisoned");
        for message in &self.messages {
            claimed.remove(&message.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::EventEnvelope;
    use serde_json::json;

    fn message_at(ts: Timestamp) -> OutboxMessage {
        let envelope = EventEnvelope::new("test.event", "agg-1", "Test", json!({}));
        OutboxMessage::from_envelope(&envelope, ts)
    }

    #[tokio::test]
    async fn claim_returns_oldest_first() {
        let store = InMemoryOutboxStore::new();
        let base = Timestamp::now();

        let late = message_at(base.plus_secs(20));
        let early = message_at(base);
        let middle = message_at(base.plus_secs(10));

        store.insert(late.clone());
        store.insert(early.clone());
        store.insert(middle.clone());

        let claim = store.claim_pending(10).await.unwrap();
        let ids: Vec<_> = claim.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![early.id, middle.id, late.id]);
    }

    #[tokio::test]
    async fn concurrent_claims_are_disjoint() {
        let store = InMemoryOutboxStore::new();
        let base = Timestamp::now();
        for i in 0..5 {
            store.insert(message_at(base.plus_secs(i)));
        }

        let first = store.claim_pending(3).await.unwrap();
        let second = store.claim_pending(3).await.unwrap();

        let first_ids: HashSet<_> = first.messages().iter().map(|m| m.id).collect();
        let second_ids: HashSet<_> = second.messages().iter().map(|m| m.id).collect();

        assert_eq!(first_ids.len(), 3);
        assert_eq!(second_ids.len(), 2);
        assert!(first_ids.is_disjoint(&second_ids));
    }

    #[tokio::test]
    async fn dropped_claim_releases_messages_unprocessed() {
        let store = InMemoryOutboxStore::new();
        store.insert(message_at(Timestamp::now()));

        {
            let mut claim = store.claim_pending(10).await.unwrap();
            let id = claim.messages()[0].id;
            claim
                .mark_processed(id, Timestamp::now(), None)
                .await
                .unwrap();
            // Dropped without commit: the buffered update is discarded.
        }

        assert_eq!(store.pending_count(), 1);
        let reclaim = store.claim_pending(10).await.unwrap();
        assert_eq!(reclaim.messages().len(), 1);
    }

    #[tokio::test]
    async fn committed_claim_persists_outcomes() {
        let store = InMemoryOutboxStore::new();
        store.insert(message_at(Timestamp::now()));

        let mut claim = store.claim_pending(10).await.unwrap();
        let id = claim.messages()[0].id;
        claim
            .mark_processed(id, Timestamp::now(), Some("boom".to_string()))
            .await
            .unwrap();
        claim.commit().await.unwrap();

        let rows = store.snapshot();
        assert!(rows[0].processed_on_utc.is_some());
        assert_eq!(rows[0].error.as_deref(), Some("boom"));
        assert_eq!(store.pending_count(), 0);
    }

    #[tokio::test]
    async fn processed_messages_are_never_reclaimed() {
        let store = InMemoryOutboxStore::new();
        store.insert(message_at(Timestamp::now()));

        let mut claim = store.claim_pending(10).await.unwrap();
        let id = claim.messages()[0].id;
        claim.mark_processed(id, Timestamp::now(), None).await.unwrap();
        claim.commit().await.unwrap();

        let reclaim = store.claim_pending(10).await.unwrap();
        assert!(reclaim.messages().is_empty());
    }
}
