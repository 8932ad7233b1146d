//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service or repository error types, so
//! the conversions from [`TypeConstraintError`] live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_errors_convert_per_layer() {
        let err: ServiceError = TypeConstraintError::InvalidAmount.into();
        assert!(matches!(err, ServiceError::TypeConstraint(_)));

        let err: RepositoryError = TypeConstraintError::InvalidDocumentId.into();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}
