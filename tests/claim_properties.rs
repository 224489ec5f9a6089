//! Property tests for the outbox claim contract.
//!
//! For any mix of occurrence times and batch sizes, a claim must return an
//! ascending prefix of the pending set, and concurrent claims must never
//! overlap.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use portfolio::adapters::memory::InMemoryOutboxStore;
use portfolio::domain::foundation::{EventEnvelope, Timestamp};
use portfolio::ports::{OutboxClaim, OutboxMessage, OutboxStore};

fn store_with_offsets(offsets: &[u64]) -> Arc<InMemoryOutboxStore> {
    let store = Arc::new(InMemoryOutboxStore::new());
    let base = Timestamp::now();
    for offset in offsets {
        let envelope = EventEnvelope::new("test.event", "agg", "Test", json!({}));
        store.insert(OutboxMessage::from_envelope(&envelope, base.plus_secs(*offset)));
    }
    store
}

proptest! {
    #[test]
    fn claim_returns_an_ascending_prefix(
        offsets in proptest::collection::vec(0u64..1_000, 1..20),
        batch_size in 1u32..10,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        rt.block_on(async {
            let store = store_with_offsets(&offsets);
            let claim = store.claim_pending(batch_size).await.unwrap();
            let messages = claim.messages();

            let expected_len = offsets.len().min(batch_size as usize);
            prop_assert_eq!(messages.len(), expected_len);

            for pair in messages.windows(2) {
                prop_assert!(pair[0].occurred_on_utc <= pair[1].occurred_on_utc);
            }

            // Nothing newer than the claimed set was skipped over.
            let claimed_ids: HashSet<_> = messages.iter().map(|m| m.id).collect();
            if let Some(newest_claimed) = messages.last() {
                for row in store.snapshot() {
                    if !claimed_ids.contains(&row.id) {
                        prop_assert!(row.occurred_on_utc >= newest_claimed.occurred_on_utc);
                    }
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn concurrent_claims_never_overlap(
        offsets in proptest::collection::vec(0u64..1_000, 1..20),
        first_batch in 1u32..10,
        second_batch in 1u32..10,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        rt.block_on(async {
            let store = store_with_offsets(&offsets);

            let first = store.claim_pending(first_batch).await.unwrap();
            let second = store.claim_pending(second_batch).await.unwrap();

            let first_ids: HashSet<_> = first.messages().iter().map(|m| m.id).collect();
            let second_ids: HashSet<_> = second.messages().iter().map(|m| m.id).collect();

            prop_assert!(first_ids.is_disjoint(&second_ids));

            let remaining = offsets.len() - first_ids.len();
            prop_assert_eq!(second_ids.len(), remaining.min(second_batch as usize));
            Ok(())
        })?;
    }
}
