//! # Summary Formatter
//!
//! Renders a tier set as one stable line for list views:
//!
//! ```text
//! 5-9 → 10% off; 10-24 → $2.5 off; 25+ → $19.99/unit
//! ```

use crate::types::{DiscountType, Tier};
use crate::NO_TIERS_SUMMARY;

const ARROW: &str = " → ";
const SEPARATOR: &str = "; ";

/// Formats `tiers` sorted by `min_qty`; the output does not depend on input
/// order (equal floors keep input order).
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tierline_core::{format_summary, DiscountType, Tier};
///
/// let tiers = vec![
///     Tier::new(10, None, DiscountType::Percent, Decimal::new(15, 0)),
///     Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)),
/// ];
/// assert_eq!(format_summary(&tiers), "5-9 → 10% off; 10+ → 15% off");
/// assert_eq!(format_summary(&[]), "No tiers configured");
/// ```
pub fn format_summary(tiers: &[Tier]) -> String {
    if tiers.is_empty() {
        return NO_TIERS_SUMMARY.to_string();
    }

    let mut sorted: Vec<&Tier> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_qty);

    sorted
        .into_iter()
        .map(|tier| format!("{}{}{}", tier.range(), ARROW, discount_label(tier)))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// `10% off`, `$2.5 off` or `$19.99/unit`.
pub fn discount_label(tier: &Tier) -> String {
    let value = tier.discount_value.normalize();
    match tier.discount_type {
        DiscountType::Percent => format!("{}% off", value),
        DiscountType::Amount => format!("${} off", value),
        DiscountType::FixedPrice => format!("${}/unit", value),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
