//! Domain events raised by the user aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, EventId, Timestamp, UserId};

/// Raised when a new user completes registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistered {
    pub event_id: EventId,
    pub user_id: UserId,
    pub occurred_at: Timestamp,
}

impl UserRegistered {
    /// Event type discriminator, as stored in the outbox `type` column.
    pub const EVENT_TYPE: &'static str = "user.registered";
}

impl DomainEvent for UserRegistered {
    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    fn aggregate_id(&self) -> String {
        self.user_id.to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "User"
    }

    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }

    fn event_id(&self) -> EventId {
        self.event_id.clone()
    }
}
