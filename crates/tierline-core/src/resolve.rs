//! # Tier Resolver
//!
//! Selects the tier that applies to a purchased quantity.
//!
//! ```text
//!   tiers (any order)      sorted by minQty desc      quantity = 12
//!   ┌──────────┐           ┌──────────┐
//!   │  5-9     │           │  10+     │ ◄── 12 ≥ 10 ✓  → wins
//!   │  10+     │    ──►    │  5-9     │
//!   └──────────┘           └──────────┘
//! ```
//!
//! Highest qualifying floor wins. On a disjoint set this is the only tier
//! that covers the quantity; on an overlapping set (validator bypassed) it
//! is the larger-quantity tier. Equal floors keep input order.

use crate::types::Tier;

/// Returns the tier covering `quantity`, or `None` when no tier applies and
/// the list price stands.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tierline_core::{resolve, DiscountType, Tier};
///
/// let tiers = vec![
///     Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)),
///     Tier::new(10, None, DiscountType::Percent, Decimal::new(15, 0)),
/// ];
/// assert_eq!(resolve(7, &tiers).map(|t| t.min_qty), Some(5));
/// assert_eq!(resolve(15, &tiers).map(|t| t.min_qty), Some(10));
/// assert!(resolve(3, &tiers).is_none());
/// ```
pub fn resolve(quantity: u32, tiers: &[Tier]) -> Option<&Tier> {
    if quantity == 0 {
        return None;
    }

    let quantity = i64::from(quantity);

    let mut candidates: Vec<&Tier> = tiers.iter().collect();
    candidates.sort_by(|a, b| b.min_qty.cmp(&a.min_qty));

    candidates.into_iter().find(|tier| tier.covers(quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscountType;
    use rust_decimal::Decimal;

    fn pct(min: i64, max: Option<i64>, value: i64) -> Tier {
        Tier::new(min, max, DiscountType::Percent, Decimal::new(value, 0))
    }

    fn ladder() -> Vec<Tier> {
        vec![pct(5, Some(9), 10), pct(10, None, 15)]
    }

    #[test]
    fn test_resolves_within_bounds() {
        let tiers = ladder();
        assert_eq!(resolve(5, &tiers), Some(&tiers[0]));
        assert_eq!(resolve(7, &tiers), Some(&tiers[0]));
        assert_eq!(resolve(9, &tiers), Some(&tiers[0]));
        assert_eq!(resolve(10, &tiers), Some(&tiers[1]));
        assert_eq!(resolve(u32::MAX, &tiers), Some(&tiers[1]));
    }

    #[test]
    fn test_below_smallest_floor_is_none() {
        let tiers = ladder();
        assert!(resolve(1, &tiers).is_none());
        assert!(resolve(4, &tiers).is_none());
    }

    #[test]
    fn test_zero_quantity_is_none() {
        let tiers = vec![pct(1, None, 5)];
        assert!(resolve(0, &tiers).is_none());
    }

    #[test]
    fn test_empty_set_is_none() {
        assert!(resolve(10, &[]).is_none());
    }

    #[test]
    fn test_gap_between_tiers_is_none() {
        let tiers = vec![pct(5, Some(9), 10), pct(20, None, 15)];
        assert!(resolve(12, &tiers).is_none());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let forward = ladder();
        let reversed: Vec<Tier> = forward.iter().rev().cloned().collect();
        for qty in 0..30 {
            assert_eq!(resolve(qty, &forward), resolve(qty, &reversed));
        }
    }

    #[test]
    fn test_overlap_favours_highest_floor() {
        let tiers = vec![pct(1, Some(100), 5), pct(10, Some(20), 20)];
        assert_eq!(resolve(15, &tiers), Some(&tiers[1]));
        assert_eq!(resolve(50, &tiers), Some(&tiers[0]));
    }

    #[test]
    fn test_equal_floors_keep_input_order() {
        let tiers = vec![pct(5, None, 10), pct(5, None, 20)];
        assert_eq!(resolve(6, &tiers).map(|t| t.discount_value), Some(Decimal::new(10, 0)));
    }

    #[test]
    fn test_open_ended_floor_is_monotonic() {
        // Once an open-ended tier applies, it applies to every larger quantity
        let tiers = ladder();
        let first = (1..100).find(|&q| resolve(q, &tiers) == Some(&tiers[1]));
        assert_eq!(first, Some(10));
        assert!((10..200).all(|q| resolve(q, &tiers) == Some(&tiers[1])));
    }
}
