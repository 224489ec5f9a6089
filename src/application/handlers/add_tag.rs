//! AddTagHandler - Command handler for creating tags.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, TagId, UserId};
use crate::domain::tag::{Tag, TagName};
use crate::ports::TagRepository;

/// Command to create a new tag.
#[derive(Debug, Clone)]
pub struct AddTagCommand {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
}

/// Handler for creating tags.
///
/// Duplicate names surface as `UniqueViolation` from the repository's commit;
/// the handler maps nothing and adds nothing.
pub struct AddTagHandler {
    tags: Arc<dyn TagRepository>,
}

impl AddTagHandler {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn handle(&self, cmd: AddTagCommand) -> Result<TagId, DomainError> {
        let mut tag = Tag::add(cmd.user_id, TagName::new(cmd.name)?, cmd.description);

        self.tags.add(&mut tag).await?;

        Ok(tag.id())
    }
}
