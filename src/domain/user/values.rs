//! Value objects for user identity fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::DomainError;

/// A user's first name. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FirstName(String);

impl FirstName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("first_name", "First name cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A user's last name. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LastName(String);

impl LastName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation("last_name", "Last name cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A user's email address.
///
/// Validation is intentionally shallow: non-empty and contains one `@` with
/// text on both sides. The identity provider is the authority on addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let valid = value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(DomainError::validation("email", "Email is malformed"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_reject_empty_input() {
        assert!(FirstName::new("").is_err());
        assert!(FirstName::new("   ").is_err());
        assert!(LastName::new("").is_err());
        assert!(FirstName::new("Ada").is_ok());
    }

    #[test]
    fn email_requires_local_and_domain_parts() {
        assert!(Email::new("ada@example.com").is_ok());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("ada@").is_err());
        assert!(Email::new("not-an-email").is_err());
    }
}
