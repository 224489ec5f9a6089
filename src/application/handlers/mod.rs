//! Command handlers (CQRS write side).

mod add_tag;
mod register_user;
mod update_user;

pub use add_tag::{AddTagCommand, AddTagHandler};
pub use register_user::{RegisterUserCommand, RegisterUserHandler};
pub use update_user::{UpdateUserCommand, UpdateUserHandler};
