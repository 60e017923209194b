//! # Price Calculator
//!
//! Turns a resolved tier and a base price into a [`ResolvedPrice`].
//!
//! ## Discount Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base = $29.99                                                          │
//! │                                                                         │
//! │  PERCENT 10      unit = base × (1 - 10/100)     = $26.991  → $26.99     │
//! │  AMOUNT  4.50    unit = max(0, base - 4.50)     = $25.49                │
//! │  FIXED_PRICE 20  unit = 20 (absolute)           = $20.00                │
//! │                                                                         │
//! │  savingsPerUnit  = max(0, base - unit)                                  │
//! │  savingsPercent  = savingsPerUnit / base × 100  (0 when base is 0)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every amount stays exact; rounding to cents happens when a [`Money`] is
//! displayed or serialised for output, never here.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::resolve::resolve;
use crate::summary::discount_label;
use crate::types::{DiscountType, PricingModel, ResolvedPrice, Tier, TierOffer};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// =============================================================================
// Price
// =============================================================================

/// Prices one unit at `base` under `tier`.
///
/// `None` means no tier applies: the list price stands with zero savings.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tierline_core::{price, DiscountType, Money, Tier};
///
/// let tier = Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0));
/// let resolved = price(Some(&tier), Money::from_cents(2999));
///
/// assert_eq!(resolved.unit_price.to_string(), "$26.99");
/// assert_eq!(resolved.savings_per_unit.to_string(), "$3.00");
/// ```
pub fn price(tier: Option<&Tier>, base: Money) -> ResolvedPrice {
    let Some(tier) = tier else {
        return ResolvedPrice {
            tier: None,
            unit_price: base,
            savings_per_unit: Money::zero(),
            savings_percent: Decimal::ZERO,
        };
    };

    let unit_price = discounted_unit_price(tier, base);
    // 0 <= savings <= base, whatever the tier holds
    let savings_per_unit = (base - unit_price)
        .min(base)
        .clamp_non_negative();

    ResolvedPrice {
        tier: Some(tier.clone()),
        unit_price,
        savings_per_unit,
        savings_percent: savings_percent(savings_per_unit, base),
    }
}

fn discounted_unit_price(tier: &Tier, base: Money) -> Money {
    match tier.discount_type {
        DiscountType::Percent if tier.discount_value >= HUNDRED => Money::zero(),
        DiscountType::Percent => {
            let factor = Decimal::ONE - tier.discount_value / HUNDRED;
            (base * factor).clamp_non_negative()
        }
        DiscountType::Amount => (base - Money::new(tier.discount_value)).clamp_non_negative(),
        // Absolute price; no further discount math applies
        DiscountType::FixedPrice => Money::new(tier.discount_value),
    }
}

fn savings_percent(savings: Money, base: Money) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    savings
        .amount()
        .checked_div(base.amount())
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

// =============================================================================
// Model-Level Helpers
// =============================================================================

/// Resolve + price for a whole model, as the storefront does it.
///
/// Fails for an inactive model or a zero quantity.
pub fn quote(model: &PricingModel, base: Money, quantity: u32) -> CoreResult<ResolvedPrice> {
    if quantity == 0 {
        return Err(CoreError::InvalidQuantity);
    }

    if !model.active {
        return Err(CoreError::ModelInactive(model.id.clone()));
    }

    Ok(price(resolve(quantity, &model.tiers), base))
}

/// What every tier is worth at `base`, in ascending `min_qty` order.
pub fn tier_offers(tiers: &[Tier], base: Money) -> Vec<TierOffer> {
    let mut sorted: Vec<&Tier> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_qty);

    sorted
        .into_iter()
        .map(|tier| {
            let resolved = price(Some(tier), base);
            TierOffer {
                min_qty: tier.min_qty,
                max_qty: tier.max_qty,
                label: discount_label(tier),
                unit_price: resolved.unit_price,
                savings_per_unit: resolved.savings_per_unit,
                savings_percent: resolved.savings_percent,
            }
        })
        .collect()
}

/// The offer with the largest per-unit savings. Ties keep the lower tier.
pub fn best_offer(tiers: &[Tier], base: Money) -> Option<TierOffer> {
    tier_offers(tiers, base)
        .into_iter()
        .fold(None, |best: Option<TierOffer>, offer| match best {
            Some(current) if current.savings_per_unit >= offer.savings_per_unit => Some(current),
            _ => Some(offer),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisplaySettings, TierSet};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn tier(kind: DiscountType, value: Decimal) -> Tier {
        Tier::new(1, None, kind, value)
    }

    fn base() -> Money {
        Money::from_cents(2999)
    }

    fn model(active: bool) -> PricingModel {
        PricingModel {
            id: "m1".to_string(),
            shop_id: "shop".to_string(),
            name: "Bulk".to_string(),
            product_ids: BTreeSet::from(["p1".to_string()]),
            tiers: TierSet::new(vec![
                Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)),
                Tier::new(10, None, DiscountType::Percent, Decimal::new(15, 0)),
            ]),
            display: DisplaySettings::default(),
            active,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_tier_keeps_list_price() {
        let resolved = price(None, base());
        assert_eq!(resolved.unit_price, base());
        assert!(resolved.savings_per_unit.is_zero());
        assert_eq!(resolved.savings_percent, Decimal::ZERO);
        assert!(resolved.tier.is_none());
        assert!(!resolved.is_discounted());
    }

    #[test]
    fn test_percent_discount() {
        let resolved = price(Some(&tier(DiscountType::Percent, Decimal::new(10, 0))), base());
        assert_eq!(resolved.unit_price.amount(), Decimal::new(26991, 3));
        assert_eq!(resolved.unit_price.to_string(), "$26.99");
        assert_eq!(resolved.savings_per_unit.to_string(), "$3.00");
        assert_eq!(resolved.savings_percent, Decimal::new(10, 0));

        let resolved = price(Some(&tier(DiscountType::Percent, Decimal::new(15, 0))), base());
        assert_eq!(resolved.unit_price.to_string(), "$25.49");
    }

    #[test]
    fn test_full_percent_discount_is_free() {
        let resolved = price(Some(&tier(DiscountType::Percent, Decimal::new(100, 0))), base());
        assert!(resolved.unit_price.is_zero());
        assert_eq!(resolved.savings_per_unit, base());
        assert_eq!(resolved.savings_percent, Decimal::new(100, 0));
    }

    #[test]
    fn test_percent_over_100_is_floored() {
        // Validator rejects this; the calculator still never goes negative
        let resolved = price(Some(&tier(DiscountType::Percent, Decimal::new(150, 0))), base());
        assert!(resolved.unit_price.is_zero());
    }

    #[test]
    fn test_extreme_values_never_panic() {
        let big = Money::from_cents(100_000);
        let cases = [
            (DiscountType::Percent, Decimal::MAX),
            (DiscountType::Percent, Decimal::MIN),
            (DiscountType::Amount, Decimal::MAX),
            (DiscountType::Amount, Decimal::MIN),
            (DiscountType::FixedPrice, Decimal::MAX),
            (DiscountType::FixedPrice, Decimal::MIN),
        ];

        for (kind, value) in cases {
            for base in [big, Money::zero(), Money::new(Decimal::MAX)] {
                let resolved = price(Some(&tier(kind, value)), base);
                assert!(!resolved.savings_per_unit.is_negative(), "{:?} {}", kind, value);
                assert!(resolved.savings_per_unit <= base, "{:?} {}", kind, value);
                assert!(resolved.savings_percent >= Decimal::ZERO);
                assert!(resolved.savings_percent <= HUNDRED);
                resolved.line_total(u32::MAX);
            }
        }

        let free = price(Some(&tier(DiscountType::Percent, Decimal::MAX)), big);
        assert!(free.unit_price.is_zero());
        assert_eq!(free.savings_per_unit, big);

        let negative_fixed = price(Some(&tier(DiscountType::FixedPrice, Decimal::MIN)), big);
        assert_eq!(negative_fixed.savings_per_unit, big);
        assert_eq!(negative_fixed.savings_percent, HUNDRED);
    }

    #[test]
    fn test_amount_discount() {
        let resolved = price(Some(&tier(DiscountType::Amount, Decimal::new(450, 2))), base());
        assert_eq!(resolved.unit_price, Money::from_cents(2549));
        assert_eq!(resolved.savings_per_unit, Money::from_cents(450));
    }

    #[test]
    fn test_amount_larger_than_base_floors_at_zero() {
        let resolved = price(Some(&tier(DiscountType::Amount, Decimal::new(50, 0))), base());
        assert!(resolved.unit_price.is_zero());
        assert_eq!(resolved.savings_per_unit, base());
    }

    #[test]
    fn test_fixed_price_is_absolute() {
        let resolved = price(Some(&tier(DiscountType::FixedPrice, Decimal::new(20, 0))), base());
        assert_eq!(resolved.unit_price, Money::from_cents(2000));
        assert_eq!(resolved.savings_per_unit, Money::from_cents(999));
    }

    #[test]
    fn test_fixed_price_above_base_clamps_savings() {
        let resolved = price(Some(&tier(DiscountType::FixedPrice, Decimal::new(35, 0))), base());
        assert_eq!(resolved.unit_price, Money::from_cents(3500));
        assert!(resolved.savings_per_unit.is_zero());
        assert_eq!(resolved.savings_percent, Decimal::ZERO);
    }

    #[test]
    fn test_zero_base_has_zero_percent() {
        let resolved = price(Some(&tier(DiscountType::Percent, Decimal::new(10, 0))), Money::zero());
        assert!(resolved.unit_price.is_zero());
        assert_eq!(resolved.savings_percent, Decimal::ZERO);

        let resolved = price(Some(&tier(DiscountType::FixedPrice, Decimal::new(5, 0))), Money::zero());
        assert!(resolved.savings_per_unit.is_zero());
        assert_eq!(resolved.savings_percent, Decimal::ZERO);
    }

    #[test]
    fn test_line_totals_round_once() {
        let resolved = price(Some(&tier(DiscountType::Percent, Decimal::new(10, 0))), base());
        assert_eq!(resolved.line_total(7).to_string(), "$188.94");
        assert_eq!(resolved.savings_total(7).to_string(), "$20.99");
    }

    #[test]
    fn test_quote_resolves_and_prices() {
        let m = model(true);
        assert_eq!(quote(&m, base(), 7).unwrap().unit_price.to_string(), "$26.99");
        assert_eq!(quote(&m, base(), 15).unwrap().unit_price.to_string(), "$25.49");
        assert_eq!(quote(&m, base(), 3).unwrap().unit_price, base());
    }

    #[test]
    fn test_quote_rejects_zero_and_inactive() {
        assert!(matches!(quote(&model(true), base(), 0), Err(CoreError::InvalidQuantity)));
        assert!(matches!(
            quote(&model(false), base(), 7),
            Err(CoreError::ModelInactive(id)) if id == "m1"
        ));
    }

    #[test]
    fn test_tier_offers_are_ascending() {
        let m = model(true);
        let reversed: Vec<Tier> = m.tiers.iter().rev().cloned().collect();
        let offers = tier_offers(&reversed, base());

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].min_qty, 5);
        assert_eq!(offers[0].label, "10% off");
        assert_eq!(offers[1].label, "15% off");
        assert_eq!(offers[1].unit_price.to_string(), "$25.49");
    }

    #[test]
    fn test_best_offer() {
        let m = model(true);
        let best = best_offer(&m.tiers, base()).unwrap();
        assert_eq!(best.min_qty, 10);

        assert!(best_offer(&[], base()).is_none());
    }

    #[test]
    fn test_best_offer_ties_keep_lower_tier() {
        let tiers = vec![
            Tier::new(10, None, DiscountType::Amount, Decimal::new(2, 0)),
            Tier::new(2, Some(9), DiscountType::Amount, Decimal::new(2, 0)),
        ];
        assert_eq!(best_offer(&tiers, base()).map(|o| o.min_qty), Some(2));
    }
}
