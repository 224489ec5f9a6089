//! RegisterUserHandler - Command handler for user registration.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::{Email, FirstName, LastName, Role, User};
use crate::ports::{IdentityProvider, UserRepository};

/// Command to register a new user.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Handler for registering users.
///
/// The save is the transactional-writer moment: the repository persists the
/// user, their role links, and the buffered `user.registered` event in one
/// transaction, so a registration either fully happens (row + outbox message)
/// or not at all.
pub struct RegisterUserHandler {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
}

impl RegisterUserHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserRepository>) -> Self {
        Self { identity, users }
    }

    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<UserId, DomainError> {
        let mut user = User::register(
            FirstName::new(cmd.first_name)?,
            LastName::new(cmd.last_name)?,
            Email::new(cmd.email)?,
            Role::from_name(&cmd.role)?,
        );

        let identity_id = self
            .identity
            .register(user.email(), user.first_name(), user.last_name(), &cmd.password)
            .await?;

        user.set_identity_id(identity_id);

        self.users.add(&mut user).await?;

        Ok(user.id())
    }
}
