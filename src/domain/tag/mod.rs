//! Tag aggregate.
//!
//! Tags label blogs. A tag raises no domain events; saving one exercises the
//! unit of work's zero-event path. Tag names are unique per the database
//! constraint, surfaced as `UniqueViolation` on commit.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Aggregate, DomainError, EventBuffer, EventEnvelope, TagId, UserId};

/// A tag name. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("name", "Tag name cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A label users attach to blogs.
#[derive(Debug, Clone)]
pub struct Tag {
    id: TagId,
    user_id: UserId,
    name: TagName,
    description: Option<String>,
    version: i32,
    events: EventBuffer,
}

impl Tag {
    /// Creates a new tag owned by `user_id`.
    pub fn add(user_id: UserId, name: TagName, description: Option<String>) -> Self {
        Self {
            id: TagId::new(),
            user_id,
            name,
            description,
            version: 0,
            events: EventBuffer::new(),
        }
    }

    /// Rehydrates a tag from storage.
    pub fn from_storage(
        id: TagId,
        user_id: UserId,
        name: TagName,
        description: Option<String>,
        version: i32,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            description,
            version,
            events: EventBuffer::new(),
        }
    }

    /// Replaces the tag's name and description.
    pub fn update_details(&mut self, name: TagName, description: Option<String>) {
        self.name = name;
        self.description = description;
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &TagName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

impl Aggregate for Tag {
    fn pull_domain_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}
