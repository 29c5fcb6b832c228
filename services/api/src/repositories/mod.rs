//! Repositories for database operations

use crate::error::DomainError;

pub mod classes;
pub mod enrollments;
pub mod waitlist;

pub use classes::ClassRepository;
pub use enrollments::EnrollmentRepository;
pub use waitlist::WaitlistRepository;

/// Map a unique-constraint violation to its domain meaning, passing any
/// other database error through.
pub(crate) fn map_unique_violation(
    err: sqlx::Error,
    constraint: &str,
    mapped: DomainError,
) -> DomainError {
    match err {
        sqlx::Error::Database(ref db) if db.constraint() == Some(constraint) => mapped,
        other => DomainError::Database(other),
    }
}
