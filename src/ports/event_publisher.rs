//! EventPublisher port - Interface for publishing domain events.
//!
//! The outbox dispatcher publishes through this port without knowing how
//! subscribers are wired. Delivery is at-least-once: handlers may see the
//! same event again after a dispatcher crash between publish and commit.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events to in-process subscribers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a single event to every handler registered for its type.
    ///
    /// All handlers are invoked even if some fail; handler failures are
    /// aggregated into the returned error.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
