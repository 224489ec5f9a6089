//! IdentityProvider port - Account creation at the external identity provider.
//!
//! Authentication itself (token issuance, JWT validation) happens upstream;
//! this core only needs to create the account during registration and link
//! the returned identity id to the user aggregate.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::user::{Email, FirstName, LastName};

/// Port for registering accounts with the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and returns the provider-assigned identity id.
    ///
    /// Fails with `EmailTaken` if the provider reports a conflict for the
    /// address.
    async fn register(
        &self,
        email: &Email,
        first_name: &FirstName,
        last_name: &LastName,
        password: &str,
    ) -> Result<String, DomainError>;
}
