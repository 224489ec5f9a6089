//! Integration tests for the transactional outbox delivery path.
//!
//! These cover the dispatcher's contract end to end over the in-memory
//! adapters: exclusive non-blocking claims, occurrence-order publishing,
//! terminal per-message failure recording, and at-least-once redelivery
//! after an abandoned claim.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use portfolio::adapters::auth::MockIdentityProvider;
use portfolio::adapters::memory::InMemoryOutboxStore;
use portfolio::adapters::{FixedClock, InMemoryEventBus, OutboxDispatcher, SystemClock};
use portfolio::application::{RegisterUserCommand, RegisterUserHandler};
use portfolio::config::OutboxConfig;
use portfolio::domain::foundation::{Aggregate, DomainError, ErrorCode, EventEnvelope, Timestamp, UserId};
use portfolio::domain::user::{User, UserRegistered};
use portfolio::ports::{
    EventHandler, EventPublisher, EventSubscriber, OutboxClaim, OutboxMessage, OutboxStore,
    UserRepository,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Counts deliveries per event id.
#[derive(Default)]
struct DeliveryLog {
    seen: Mutex<HashMap<String, usize>>,
}

impl DeliveryLog {
    fn times_seen(&self, event_id: &str) -> usize {
        *self.seen.lock().unwrap().get(event_id).unwrap_or(&0)
    }

    fn total(&self) -> usize {
        self.seen.lock().unwrap().values().sum()
    }
}

struct CountingHandler {
    log: Arc<DeliveryLog>,
    /// Event ids this handler refuses to process.
    poison: Vec<String>,
}

impl CountingHandler {
    fn new(log: Arc<DeliveryLog>) -> Self {
        Self {
            log,
            poison: Vec::new(),
        }
    }

    fn poisoned_on(log: Arc<DeliveryLog>, poison: Vec<String>) -> Self {
        Self { log, poison }
    }
}

#[async_trait]
impl EventHandler for CountingHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        *self
            .log
            .seen
            .lock()
            .unwrap()
            .entry(event.event_id.to_string())
            .or_insert(0) += 1;

        if self.poison.contains(&event.event_id.to_string()) {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "poisoned event rejected",
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CountingHandler"
    }
}

fn dispatcher(
    store: Arc<InMemoryOutboxStore>,
    bus: Arc<InMemoryEventBus>,
    batch_size: u32,
) -> OutboxDispatcher {
    OutboxDispatcher::new(
        store,
        bus,
        Arc::new(SystemClock),
        OutboxConfig {
            interval_in_seconds: 1,
            batch_size,
        },
    )
}

fn pending_message(occurred_on: Timestamp) -> OutboxMessage {
    let envelope = EventEnvelope::new("user.registered", "user-1", "User", json!({"n": 1}));
    OutboxMessage::from_envelope(&envelope, occurred_on)
}

// =============================================================================
// Integration Tests
// =============================================================================

/// Scenario: one pending message, generous batch size. After the run the row
/// is processed without error and the handler observed the event exactly once.
#[tokio::test]
async fn single_pending_message_is_processed_once() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let log = Arc::new(DeliveryLog::default());
    bus.subscribe("user.registered", Arc::new(CountingHandler::new(log.clone())));

    let message = pending_message(Timestamp::now());
    let event_id = message.envelope().unwrap().event_id.to_string();
    store.insert(message);

    let dispatch_time = Timestamp::now().plus_secs(5);
    let dispatcher = OutboxDispatcher::new(
        store.clone(),
        bus,
        Arc::new(FixedClock::at(dispatch_time)),
        OutboxConfig {
            interval_in_seconds: 1,
            batch_size: 10,
        },
    );

    let outcome = dispatcher.process_batch().await.unwrap();

    assert_eq!(outcome.claimed, 1);
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 0);

    let rows = store.snapshot();
    assert_eq!(rows[0].processed_on_utc, Some(dispatch_time));
    assert!(rows[0].error.is_none());
    assert_eq!(log.times_seen(&event_id), 1);
}

/// Pending messages are published oldest first regardless of insert order.
#[tokio::test]
async fn batch_publishes_in_occurrence_order() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());

    let base = Timestamp::now();
    let second = pending_message(base.plus_secs(10));
    let third = pending_message(base.plus_secs(20));
    let first = pending_message(base);

    // Deliberately inserted newest-first.
    store.insert(third.clone());
    store.insert(first.clone());
    store.insert(second.clone());

    dispatcher(store, bus.clone(), 10).process_batch().await.unwrap();

    let published: Vec<_> = bus
        .published_events()
        .iter()
        .map(|e| e.event_id.to_string())
        .collect();
    let expected: Vec<_> = [&first, &second, &third]
        .iter()
        .map(|m| m.envelope().unwrap().event_id.to_string())
        .collect();

    assert_eq!(published, expected);
}

/// Once a row is marked processed, later runs never select it again.
#[tokio::test]
async fn processed_rows_are_never_selected_again() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let log = Arc::new(DeliveryLog::default());
    bus.subscribe("user.registered", Arc::new(CountingHandler::new(log.clone())));

    store.insert(pending_message(Timestamp::now()));

    let dispatcher = dispatcher(store.clone(), bus, 10);
    let first = dispatcher.process_batch().await.unwrap();
    let second = dispatcher.process_batch().await.unwrap();

    assert_eq!(first.claimed, 1);
    assert_eq!(second.claimed, 0);
    assert_eq!(log.total(), 1);
}

/// A handler failure on one message is recorded on that row alone; its
/// neighbors complete cleanly in the same batch.
#[tokio::test]
async fn failure_of_one_message_does_not_touch_its_neighbors() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let log = Arc::new(DeliveryLog::default());

    let base = Timestamp::now();
    let messages: Vec<_> = (0..3).map(|i| pending_message(base.plus_secs(i))).collect();
    let poisoned_id = messages[1].envelope().unwrap().event_id.to_string();

    bus.subscribe(
        "user.registered",
        Arc::new(CountingHandler::poisoned_on(
            log.clone(),
            vec![poisoned_id.clone()],
        )),
    );

    for message in &messages {
        store.insert(message.clone());
    }

    let outcome = dispatcher(store.clone(), bus, 10)
        .process_batch()
        .await
        .unwrap();

    assert_eq!(outcome.claimed, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);

    for row in store.snapshot() {
        assert!(row.processed_on_utc.is_some(), "every row is marked processed");
        let envelope_id = row.envelope().unwrap().event_id.to_string();
        if envelope_id == poisoned_id {
            let error = row.error.expect("poisoned row records the failure");
            assert!(error.contains("CountingHandler"));
            assert!(error.contains("poisoned event rejected"));
        } else {
            assert!(row.error.is_none());
        }
    }

    assert_eq!(log.total(), 3);
}

/// Scenario: two dispatcher instances race over five pending rows with batch
/// size three. The claims are disjoint, so every row is processed exactly
/// once and none is left pending.
#[tokio::test]
async fn concurrent_runs_process_every_row_exactly_once() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let log = Arc::new(DeliveryLog::default());
    bus.subscribe("user.registered", Arc::new(CountingHandler::new(log.clone())));

    let base = Timestamp::now();
    let mut event_ids = Vec::new();
    for i in 0..5 {
        let message = pending_message(base.plus_secs(i));
        event_ids.push(message.envelope().unwrap().event_id.to_string());
        store.insert(message);
    }

    let left = dispatcher(store.clone(), bus.clone(), 3);
    let right = dispatcher(store.clone(), bus.clone(), 3);

    let (left_outcome, right_outcome) =
        tokio::join!(left.process_batch(), right.process_batch());

    let claimed_total = left_outcome.unwrap().claimed + right_outcome.unwrap().claimed;
    assert_eq!(claimed_total, 5);
    assert_eq!(store.pending_count(), 0);

    for event_id in &event_ids {
        assert_eq!(log.times_seen(event_id), 1, "no row is delivered twice");
    }
}

/// Repository double that plays the transactional writer: saving drains the
/// aggregate's events into the outbox store.
struct OutboxBackedUserRepository {
    outbox: Arc<InMemoryOutboxStore>,
}

#[async_trait]
impl UserRepository for OutboxBackedUserRepository {
    async fn add(&self, user: &mut User) -> Result<(), DomainError> {
        let now = Timestamp::now();
        for envelope in user.pull_domain_events() {
            self.outbox.insert(OutboxMessage::from_envelope(&envelope, now));
        }
        Ok(())
    }

    async fn update(&self, _user: &mut User) -> Result<(), DomainError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, DomainError> {
        Ok(None)
    }

    async fn find_by_identity_id(&self, _identity_id: &str) -> Result<Option<User>, DomainError> {
        Ok(None)
    }
}

/// Full pipeline: registering a user persists one pending `user.registered`
/// message; the next dispatcher run delivers it to the subscriber and marks
/// the row processed.
#[tokio::test]
async fn registration_event_flows_from_outbox_to_handler() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let log = Arc::new(DeliveryLog::default());
    bus.subscribe(
        UserRegistered::EVENT_TYPE,
        Arc::new(CountingHandler::new(log.clone())),
    );

    let handler = RegisterUserHandler::new(
        Arc::new(MockIdentityProvider::new()),
        Arc::new(OutboxBackedUserRepository {
            outbox: store.clone(),
        }),
    );

    let user_id = handler
        .handle(RegisterUserCommand {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            role: "Registered".to_string(),
        })
        .await
        .unwrap();

    // Committed but not yet delivered.
    let rows = store.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event_type, UserRegistered::EVENT_TYPE);
    assert!(rows[0].is_pending());

    let outcome = dispatcher(store.clone(), bus.clone(), 10)
        .process_batch()
        .await
        .unwrap();
    assert_eq!(outcome.succeeded, 1);

    let delivered = bus.published_events();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].aggregate_id, user_id.to_string());
    assert_eq!(log.total(), 1);
    assert_eq!(store.pending_count(), 0);
}

/// An abandoned claim (crash before commit) leaves its rows pending; the next
/// run re-delivers them. Duplicate delivery here is the accepted cost of
/// at-least-once.
#[tokio::test]
async fn abandoned_claim_leads_to_redelivery() {
    let store = Arc::new(InMemoryOutboxStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let log = Arc::new(DeliveryLog::default());
    bus.subscribe("user.registered", Arc::new(CountingHandler::new(log.clone())));

    let message = pending_message(Timestamp::now());
    let event_id = message.envelope().unwrap().event_id.to_string();
    store.insert(message);

    let dispatcher = dispatcher(store.clone(), bus.clone(), 10);

    // First run: publish happens, then the "process" dies before commit.
    {
        let mut claim = store.claim_pending(10).await.unwrap();
        let claimed = claim.messages().to_vec();
        for m in &claimed {
            bus.publish(m.envelope().unwrap()).await.unwrap();
            claim
                .mark_processed(m.id, Timestamp::now(), None)
                .await
                .unwrap();
        }
        // Claim dropped here without commit.
    }

    assert_eq!(store.pending_count(), 1);

    // Next scheduled run picks the row up again.
    let outcome = dispatcher.process_batch().await.unwrap();
    assert_eq!(outcome.claimed, 1);
    assert_eq!(store.pending_count(), 0);
    assert_eq!(log.times_seen(&event_id), 2);
}
