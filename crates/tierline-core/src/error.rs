//! # Error Types
//!
//! Domain-specific error types for tierline-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ValidationError  - one configuration problem (field + message)        │
//! │                     returned as a list, never raised                    │
//! │                                                                         │
//! │  CoreError        - the few core calls that can genuinely fail         │
//! │                     (bad enum text, quoting an inactive model, ...)    │
//! │                                                                         │
//! │  NOT errors:                                                            │
//! │  • resolve() returning None  → "no tier applies, use list price"       │
//! │  • zero base price           → savingsPercent falls back to 0          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError::InvalidModel → DbError/Service     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Field Tags
// =============================================================================

/// The input field a [`ValidationError`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    MinQty,
    MaxQty,
    DiscountValue,
    Name,
    Products,
}

impl Field {
    /// The interchange spelling of the field (`minQty`, `discountValue`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Field::MinQty => "minQty",
            Field::MaxQty => "maxQty",
            Field::DiscountValue => "discountValue",
            Field::Name => "name",
            Field::Products => "products",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single configuration problem.
///
/// Validators collect these into a `Vec` so the admin surface can show every
/// problem at once. `tier_index` points into the caller's tier list (input
/// order, not sorted order) and is `None` for model-level checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tier_index: Option<usize>,
}

impl ValidationError {
    /// Creates a model-level error (`name`, `products`).
    pub fn model(field: Field, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
            tier_index: None,
        }
    }

    /// Creates an error attached to the tier at `index`.
    pub fn tier(index: usize, field: Field, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
            tier_index: Some(index),
        }
    }

    /// Form path of the offending input, e.g. `tiers[1].minQty` or `name`.
    pub fn path(&self) -> String {
        match self.tier_index {
            Some(index) => format!("tiers[{}].{}", index, self.field),
            None => self.field.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.message)
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Discount type text not recognised (canonical or legacy spelling).
    #[error("Unknown discount type: {0}")]
    UnknownDiscountType(String),

    /// Display style text not recognised.
    #[error("Unknown display style: {0}")]
    UnknownDisplayStyle(String),

    /// Badge tone text not recognised.
    #[error("Unknown badge tone: {0}")]
    UnknownBadgeTone(String),

    /// Amount text could not be parsed as a decimal.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Quote requested for a non-positive quantity.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// Customer-facing pricing requested for an inactive model.
    #[error("Pricing model {0} is not active")]
    ModelInactive(String),

    /// Model failed validation.
    #[error("Invalid pricing model ({} problem(s)): {}", .0.len(), join_errors(.0))]
    InvalidModel(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_path() {
        let err = ValidationError::tier(2, Field::MaxQty, "bad");
        assert_eq!(err.path(), "tiers[2].maxQty");
        assert_eq!(err.to_string(), "tiers[2].maxQty: bad");

        let err = ValidationError::model(Field::Name, "Model name is required");
        assert_eq!(err.path(), "name");
        assert_eq!(err.to_string(), "name: Model name is required");
    }

    #[test]
    fn test_validation_error_json_shape() {
        let err = ValidationError::tier(0, Field::DiscountValue, "too big");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "discountValue");
        assert_eq!(json["message"], "too big");
        assert_eq!(json["tierIndex"], 0);

        let err = ValidationError::model(Field::Products, "none");
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("tierIndex").is_none());
    }

    #[test]
    fn test_invalid_model_message() {
        let err = CoreError::InvalidModel(vec![
            ValidationError::model(Field::Name, "Model name is required"),
            ValidationError::model(Field::Products, "At least one product must be selected"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid pricing model (2 problem(s)): name: Model name is required; \
             products: At least one product must be selected"
        );
    }
}
