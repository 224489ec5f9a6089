//! PostgreSQL adapters.
//!
//! Implementations of the persistence ports on sqlx. All mutating operations
//! go through [`UnitOfWork`] so aggregate changes and outbox rows commit
//! atomically.

mod authorization_reader;
mod blog_repository;
mod outbox_store;
mod tag_repository;
mod unit_of_work;
mod user_repository;

pub use authorization_reader::PostgresAuthorizationReader;
pub use blog_repository::PostgresBlogRepository;
pub use outbox_store::PostgresOutboxStore;
pub use tag_repository::PostgresTagRepository;
pub use unit_of_work::UnitOfWork;
pub use user_repository::PostgresUserRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Maps a sqlx error to the domain taxonomy.
///
/// Distinguished SQLSTATEs: `23505` (unique constraint) and `40001`
/// (serialization failure under concurrent commits); everything else is a
/// generic database error.
pub(crate) fn map_db_err(context: &str, error: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &error {
        match db.code().as_deref() {
            Some("23505") => {
                return DomainError::new(
                    ErrorCode::UniqueViolation,
                    format!("{}: {}", context, db.message()),
                );
            }
            Some("40001") => {
                return DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    format!("{}: {}", context, db.message()),
                );
            }
            _ => {}
        }
    }

    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, error))
}
