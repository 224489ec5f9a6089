//! BlogRepository port.

use async_trait::async_trait;

use crate::domain::blog::Blog;
use crate::domain::foundation::{BlogId, DomainError};

/// Port for persisting blog aggregates.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Inserts a new blog and its tag links.
    async fn add(&self, blog: &mut Blog) -> Result<(), DomainError>;

    /// Loads a blog by id.
    async fn find_by_id(&self, id: BlogId) -> Result<Option<Blog>, DomainError>;
}
