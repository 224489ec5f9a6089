//! UpdateUserHandler - Command handler for renaming users.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::{FirstName, LastName};
use crate::ports::UserRepository;

/// Command to update a user's name.
#[derive(Debug, Clone)]
pub struct UpdateUserCommand {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

/// Handler for updating users.
///
/// The repository's version check turns a lost race into a
/// `ConcurrencyConflict`, which callers map to a retryable response.
pub struct UpdateUserHandler {
    users: Arc<dyn UserRepository>,
}

impl UpdateUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, cmd: UpdateUserCommand) -> Result<(), DomainError> {
        let Some(mut user) = self.users.find_by_id(cmd.user_id).await? else {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User {} does not exist", cmd.user_id),
            ));
        };

        user.rename(FirstName::new(cmd.first_name)?, LastName::new(cmd.last_name)?);

        self.users.update(&mut user).await
    }
}
