//! Mock identity provider for tests and local runs.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::{Email, FirstName, LastName};
use crate::ports::IdentityProvider;

/// In-memory implementation of [`IdentityProvider`].
///
/// Assigns `identity-{n}` ids in registration order and reports `EmailTaken`
/// on a repeated address, like the real provider would.
#[derive(Default)]
pub struct MockIdentityProvider {
    registered: Mutex<HashSet<String>>,
}

impl MockIdentityProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn register(
        &self,
        email: &Email,
        _first_name: &FirstName,
        _last_name: &LastName,
        _password: &str,
    ) -> Result<String, DomainError> {
        let mut registered = self
            .registered
            .lock()
            .expect("MockIdentityProvider: lock poisoned");

        if !registered.insert(email.as_str().to_string()) {
            return Err(DomainError::new(
                ErrorCode::EmailTaken,
                "The email is already registered",
            )
            .with_detail("email", email.as_str()));
        }

        Ok(format!("identity-{}", registered.len()))
    }
}
