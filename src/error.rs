use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core operations.
///
/// Every failure here is transient from the caller's point of view: retrying
/// the originating operation is always safe. Already-following and similar
/// no-op outcomes are reported as `Ok` values, never as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The referenced row does not exist, or a credential check failed.
    /// Login deliberately collapses "unknown id" and "wrong secret" into
    /// this one variant to resist enumeration.
    #[error("not found")]
    NotFound,

    /// The caller supplied a value the store refuses to persist.
    #[error("validation: {0}")]
    Validation(String),

    /// A storage constraint fired under a racing write. Retryable.
    #[error("conflicting concurrent write, retry the operation")]
    Conflict,

    /// Schema migration failure at startup.
    #[error("migration error: {0}")]
    Migration(String),

    /// Any other storage error, passed through unmodified.
    #[error("database error: {0}")]
    Database(diesel::result::Error),

    /// Connection pool exhaustion or checkout failure.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};
        match e {
            DieselError::NotFound => Error::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => Error::Conflict,
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        let err = Error::from(diesel::result::Error::NotFound);
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = Error::from(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("UNIQUE constraint failed".to_string()),
        ));
        assert!(matches!(err, Error::Conflict));
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = Error::from(diesel::result::Error::RollbackTransaction);
        assert!(matches!(
            err,
            Error::Database(diesel::result::Error::RollbackTransaction)
        ));
    }
}
