//! Query service layer and write paths for every clinic entity.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod appointments;
pub mod catalog;
pub mod documents;
pub mod entity;
pub mod inventory;
pub mod listing;
pub mod patients;
pub mod payments;
pub mod treatments;

/// Write operation reported in [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Form error: {0}")]
    Form(String),

    #[error("Type constraint error: {0}")]
    TypeConstraint(String),

    /// An update carried a stale version token.
    #[error("Cannot {operation} {entity}: it was modified by someone else")]
    Conflict {
        entity: &'static str,
        operation: Operation,
    },

    #[error("Failed to {operation} {entity}: {source}")]
    Mutation {
        entity: &'static str,
        operation: Operation,
        #[source]
        source: RepositoryError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Wraps a failed write with the entity and operation it belongs to.
    pub fn mutation(entity: &'static str, operation: Operation, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound(entity),
            RepositoryError::Conflict { .. } => ServiceError::Conflict { entity, operation },
            source => ServiceError::Mutation {
                entity,
                operation,
                source,
            },
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound("document"),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
