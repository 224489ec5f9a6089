//! User aggregate, roles, and permissions.

mod events;
mod role;
mod user;
mod values;

pub use events::UserRegistered;
pub use role::{permissions, Role};
pub use user::User;
pub use values::{Email, FirstName, LastName};
