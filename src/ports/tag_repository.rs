//! TagRepository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TagId};
use crate::domain::tag::Tag;

/// Port for persisting tag aggregates.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Inserts a new tag.
    ///
    /// Fails with `UniqueViolation` if the name is already taken.
    async fn add(&self, tag: &mut Tag) -> Result<(), DomainError>;

    /// Updates an existing tag with an optimistic version check.
    async fn update(&self, tag: &mut Tag) -> Result<(), DomainError>;

    /// Loads a tag by id.
    async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>, DomainError>;
}
