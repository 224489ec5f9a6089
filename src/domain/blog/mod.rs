//! Blog aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    Aggregate, BlogId, DomainError, EventBuffer, EventEnvelope, TagId, Timestamp, UserId,
};

/// Publication state of a blog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlogStatus {
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "draft" => Ok(BlogStatus::Draft),
            "published" => Ok(BlogStatus::Published),
            other => Err(DomainError::validation(
                "status",
                format!("Unknown blog status: {}", other),
            )),
        }
    }
}

/// A blog post with its tag links.
#[derive(Debug, Clone)]
pub struct Blog {
    id: BlogId,
    user_id: UserId,
    title: String,
    content: String,
    summary: String,
    status: BlogStatus,
    published_at: Timestamp,
    updated_at: Option<Timestamp>,
    tag_ids: Vec<TagId>,
    version: i32,
    events: EventBuffer,
}

impl Blog {
    /// Creates a new blog post.
    pub fn add(
        user_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
        summary: impl Into<String>,
        status: BlogStatus,
        published_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "Blog title cannot be empty"));
        }

        Ok(Self {
            id: BlogId::new(),
            user_id,
            title,
            content: content.into(),
            summary: summary.into(),
            status,
            published_at,
            updated_at: None,
            tag_ids: Vec::new(),
            version: 0,
            events: EventBuffer::new(),
        })
    }

    /// Rehydrates a blog from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: BlogId,
        user_id: UserId,
        title: String,
        content: String,
        summary: String,
        status: BlogStatus,
        published_at: Timestamp,
        updated_at: Option<Timestamp>,
        tag_ids: Vec<TagId>,
        version: i32,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            content,
            summary,
            status,
            published_at,
            updated_at,
            tag_ids,
            version,
            events: EventBuffer::new(),
        }
    }

    /// Links a tag to this blog. Linking twice is a no-op.
    pub fn attach_tag(&mut self, tag_id: TagId) {
        if !self.tag_ids.contains(&tag_id) {
            self.tag_ids.push(tag_id);
        }
    }

    pub fn id(&self) -> BlogId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn status(&self) -> BlogStatus {
        self.status
    }

    pub fn published_at(&self) -> Timestamp {
        self.published_at
    }

    pub fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }

    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

impl Aggregate for Blog {
    fn pull_domain_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_empty_title() {
        let result = Blog::add(
            UserId::new(),
            "",
            "content",
            "summary",
            BlogStatus::Draft,
            Timestamp::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn attach_tag_is_idempotent() {
        let mut blog = Blog::add(
            UserId::new(),
            "Outbox patterns",
            "content",
            "summary",
            BlogStatus::Published,
            Timestamp::now(),
        )
        .unwrap();

        let tag = TagId::new();
        blog.attach_tag(tag);
        blog.attach_tag(tag);

        assert_eq!(blog.tag_ids(), &[tag]);
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(BlogStatus::parse("draft").unwrap(), BlogStatus::Draft);
        assert_eq!(
            BlogStatus::parse(BlogStatus::Published.as_str()).unwrap(),
            BlogStatus::Published
        );
        assert!(BlogStatus::parse("archived").is_err());
    }
}
