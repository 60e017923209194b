//! # Services
//!
//! The two surfaces that consume the pricing core.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AdminService                        StorefrontService<C: Catalog>      │
//! │  validate ─► persist ─► invalidate   cache ─► model ─► resolve ─► price │
//! │       │                                   │                             │
//! │       └──────────── Database (shop-scoped repositories) ◄───────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod admin;
pub mod storefront;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::error::DbError;
use tierline_core::{CoreError, ValidationError};

/// Service-layer errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(CoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Every problem found in the submitted model.
    #[error("Invalid pricing model: {}", describe(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

impl ServiceError {
    /// Validation problems, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            ServiceError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::Db(err) => err.is_not_found(),
            ServiceError::ProductNotFound(_) => true,
            _ => false,
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidModel(errors) => ServiceError::Invalid(errors),
            other => ServiceError::Core(other),
        }
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tierline_core::Field;

    #[test]
    fn test_invalid_model_becomes_invalid() {
        let err: ServiceError = CoreError::InvalidModel(vec![ValidationError::model(
            Field::Name,
            "Model name is required",
        )])
        .into();

        assert_eq!(err.validation_errors().map(<[_]>::len), Some(1));
        assert_eq!(err.to_string(), "Invalid pricing model: name: Model name is required");
    }

    #[test]
    fn test_other_core_errors_pass_through() {
        let err: ServiceError = CoreError::InvalidQuantity.into();
        assert!(matches!(err, ServiceError::Core(CoreError::InvalidQuantity)));
        assert!(!err.is_not_found());
    }
}
