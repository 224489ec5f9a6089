//! Application layer - Command handlers and authorization services.
//!
//! Orchestrates domain operations across ports. Command handlers drive the
//! transactional writer through the repositories; the authorization cache
//! answers the per-request permission checks.

pub mod authorization;
pub mod handlers;

pub use authorization::AuthorizationCache;
pub use handlers::{
    AddTagCommand, AddTagHandler, RegisterUserCommand, RegisterUserHandler, UpdateUserCommand,
    UpdateUserHandler,
};
