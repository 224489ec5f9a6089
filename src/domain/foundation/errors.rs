//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    RoleInvalid,

    // Not found errors
    UserNotFound,
    TagNotFound,
    BlogNotFound,

    // Persistence conflicts
    ConcurrencyConflict,
    UniqueViolation,

    // Identity provider errors
    EmailTaken,
    IdentityProviderError,

    // Event delivery errors
    EventHandlerFailed,

    // Infrastructure errors
    DatabaseError,
    CacheError,
    SerializationError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::RoleInvalid => "ROLE_INVALID",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::TagNotFound => "TAG_NOT_FOUND",
            ErrorCode::BlogNotFound => "BLOG_NOT_FOUND",
            ErrorCode::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            ErrorCode::UniqueViolation => "UNIQUE_VIOLATION",
            ErrorCode::EmailTaken => "EMAIL_TAKEN",
            ErrorCode::IdentityProviderError => "IDENTITY_PROVIDER_ERROR",
            ErrorCode::EventHandlerFailed => "EVENT_HANDLER_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::CacheError => "CACHE_ERROR",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns true if this error is a persistence conflict the caller may retry.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConcurrencyConflict | ErrorCode::UniqueViolation
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::UserNotFound, "User not found");
        assert_eq!(format!("{}", err), "[USER_NOT_FOUND] User not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::validation("email", "Email is malformed")
            .with_detail("value", "not-an-email");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"email".to_string()));
        assert_eq!(err.details.get("value"), Some(&"not-an-email".to_string()));
    }

    #[test]
    fn conflict_codes_are_retryable() {
        assert!(DomainError::new(ErrorCode::ConcurrencyConflict, "stale version").is_conflict());
        assert!(DomainError::new(ErrorCode::UniqueViolation, "duplicate name").is_conflict());
        assert!(!DomainError::new(ErrorCode::DatabaseError, "connection lost").is_conflict());
    }
}
