//! # Validation Module
//!
//! The Tier Validator: structural checks per tier, pairwise overlap checks
//! across the set, and the model-level name / products checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tier Validation Pass                               │
//! │                                                                         │
//! │  input order:  [8-20]  [5-10]  [30+]                                   │
//! │                   │       │       │                                     │
//! │  scan order:   [5-10]  [8-20]  [30+]     (ascending minQty, stable)    │
//! │                   │       │       │                                     │
//! │  per tier:     minQty ≥ 1, discountValue > 0, PERCENT ≤ 100,           │
//! │                maxQty > minQty                                         │
//! │                   │       │       │                                     │
//! │  overlap:         -    vs [5-10]  vs [5-10],[8-20]                      │
//! │                          ✗ stop                                         │
//! │                                                                         │
//! │  → one error: tiers[0].minQty "Overlaps with existing tier (5-10)"     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation is pure and total: it never fails, it only reports. An empty
//! tier list produces no tier-level errors.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, Field, ValidationError};
use crate::types::{DiscountType, ModelDraft, Tier};
use crate::{MAX_PERCENT_DISCOUNT, MIN_MODEL_NAME_LEN};

// =============================================================================
// Tier Checks
// =============================================================================

/// Validates a tier set.
///
/// Tiers are scanned in ascending `min_qty` order. Each tier gets its field
/// checks, then is compared against the tiers scanned before it; the first
/// conflict is reported and the rest are skipped for that tier. Every error
/// carries the tier's index in `tiers` as given.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tierline_core::{validate, DiscountType, Field, Tier};
///
/// let tiers = vec![
///     Tier::new(5, Some(10), DiscountType::Percent, Decimal::new(10, 0)),
///     Tier::new(8, Some(20), DiscountType::Percent, Decimal::new(15, 0)),
/// ];
/// let errors = validate(&tiers);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].field, Field::MinQty);
/// assert_eq!(errors[0].tier_index, Some(1));
/// ```
pub fn validate(tiers: &[Tier]) -> Vec<ValidationError> {
    let mut order: Vec<usize> = (0..tiers.len()).collect();
    order.sort_by_key(|&index| tiers[index].min_qty);

    let mut errors = Vec::new();

    for (position, &index) in order.iter().enumerate() {
        let tier = &tiers[index];
        errors.extend(check_tier_fields(index, tier));

        let conflict = order[..position]
            .iter()
            .map(|&earlier| &tiers[earlier])
            .find(|earlier| tier.range().overlaps(&earlier.range()));

        if let Some(earlier) = conflict {
            errors.push(ValidationError::tier(
                index,
                Field::MinQty,
                format!("Overlaps with existing tier ({})", earlier.range()),
            ));
        }
    }

    errors
}

/// Field-level checks for a single tier.
fn check_tier_fields(index: usize, tier: &Tier) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if tier.min_qty < 1 {
        errors.push(ValidationError::tier(
            index,
            Field::MinQty,
            "Minimum quantity must be at least 1",
        ));
    }

    if tier.discount_value <= Decimal::ZERO {
        errors.push(ValidationError::tier(
            index,
            Field::DiscountValue,
            "Discount value must be greater than 0",
        ));
    } else if tier.discount_type == DiscountType::Percent
        && tier.discount_value > Decimal::from(MAX_PERCENT_DISCOUNT)
    {
        errors.push(ValidationError::tier(
            index,
            Field::DiscountValue,
            "Percentage discount cannot exceed 100%",
        ));
    }

    if let Some(max_qty) = tier.max_qty {
        if max_qty <= tier.min_qty {
            errors.push(ValidationError::tier(
                index,
                Field::MaxQty,
                "Maximum quantity must be greater than minimum quantity",
            ));
        }
    }

    errors
}

// =============================================================================
// Model Checks
// =============================================================================

/// Name must be present and at least [`MIN_MODEL_NAME_LEN`] characters once
/// trimmed.
pub fn validate_model_name(name: &str) -> Option<ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Some(ValidationError::model(Field::Name, "Model name is required"));
    }

    if trimmed.chars().count() < MIN_MODEL_NAME_LEN {
        return Some(ValidationError::model(
            Field::Name,
            format!("Model name must be at least {} characters", MIN_MODEL_NAME_LEN),
        ));
    }

    None
}

/// At least one product must be associated.
///
/// Blank ids count as missing: storage never links them, so a set of only
/// blanks would persist as a model with no products.
pub fn validate_products<'a, I>(product_ids: I) -> Option<ValidationError>
where
    I: IntoIterator<Item = &'a String>,
{
    let has_product = product_ids.into_iter().any(|id| !id.trim().is_empty());

    if has_product {
        None
    } else {
        Some(ValidationError::model(
            Field::Products,
            "At least one product must be selected",
        ))
    }
}

/// Full admin-side validation: name, products, then tiers.
pub fn validate_model(draft: &ModelDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(validate_model_name(&draft.name));
    errors.extend(validate_products(&draft.product_ids));
    errors.extend(validate(&draft.tiers));
    errors
}

/// [`validate_model`] as a `Result`, for callers that want `?`.
pub fn ensure_valid(draft: &ModelDraft) -> CoreResult<()> {
    let errors = validate_model(draft);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidModel(errors))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
