use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Errors raised by the document backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Document not found")]
    NotFound,

    /// The document changed since the version the caller read.
    #[error("Version conflict: expected {expected}, found {found}")]
    Conflict { expected: i32, found: i32 },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,

            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    // Duplicate document id.
                    DatabaseErrorKind::UniqueViolation => RepositoryError::ConstraintViolation(
                        format!("Unique constraint violation: {message}"),
                    ),
                    // Payload that is not valid JSON.
                    DatabaseErrorKind::CheckViolation => RepositoryError::ConstraintViolation(
                        format!("Check constraint violation: {message}"),
                    ),
                    _ => RepositoryError::DatabaseError(message),
                }
            }

            DieselError::DeserializationError(e) => {
                RepositoryError::ValidationError(format!("Deserialization error: {e}"))
            }

            _ => RepositoryError::Unexpected(format!("Unexpected diesel error: {err}")),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(format!("Connection error: {err}"))
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(format!("Connection error: {err}"))
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::ValidationError(format!("Malformed document payload: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_string()))
    }

    #[test]
    fn store_constraints_map_to_constraint_violations() {
        let err: RepositoryError = database_error(
            DatabaseErrorKind::UniqueViolation,
            "UNIQUE constraint failed: documents.id",
        )
        .into();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));

        let err: RepositoryError =
            database_error(DatabaseErrorKind::CheckViolation, "CHECK constraint failed").into();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }

    #[test]
    fn other_diesel_errors_keep_their_message() {
        let err: RepositoryError =
            database_error(DatabaseErrorKind::Unknown, "database is locked").into();
        assert_eq!(err.to_string(), "Database error: database is locked");

        let err: RepositoryError = DieselError::NotFound.into();
        assert!(matches!(err, RepositoryError::NotFound));

        let err: RepositoryError = DieselError::RollbackTransaction.into();
        assert!(matches!(err, RepositoryError::Unexpected(_)));
    }
}
