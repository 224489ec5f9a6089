//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed persistence (repositories, outbox, unit of work)
//! - `redis` - distributed cache store
//! - `events` - in-process event bus and the outbox dispatcher
//! - `auth` - identity provider (Keycloak, mock)
//! - `memory` - in-memory test doubles with full port semantics
//! - `clock` - system and fixed clocks

pub mod auth;
pub mod clock;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use clock::{FixedClock, SystemClock};
pub use events::{BatchOutcome, InMemoryEventBus, OutboxDispatcher};
