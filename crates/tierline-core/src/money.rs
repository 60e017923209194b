//! # Money Module
//!
//! Provides the `Money` type for single-currency decimal amounts.
//!
//! ## Why Decimal, Rounded Late?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING PROBLEM                                                   │
//! │                                                                         │
//! │  Floating point:                                                        │
//! │    29.99 × 0.9 = 26.990999999999996  ❌ drift                           │
//! │                                                                         │
//! │  Integer cents, rounded at every step:                                 │
//! │    2999 × 0.9 = 2699.1 → 2699, then × qty, then savings ...            │
//! │    each step loses a fraction of a cent  ❌ compounding                  │
//! │                                                                         │
//! │  OUR SOLUTION: exact Decimal, round only for output                    │
//! │    29.99 × 0.9 = 26.991 (kept exactly)                                 │
//! │    Display → "$26.99"                                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tierline_core::money::Money;
//!
//! let price = Money::from_cents(2999);           // $29.99
//! let line = price * 3;                          // $89.97
//! assert_eq!(line.to_string(), "$89.97");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::error::CoreError;

/// Decimal places used when an amount leaves the engine.
pub const OUTPUT_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the shop's single currency.
///
/// Serialises as a decimal string (`"29.99"`) and accepts JSON numbers or
/// strings on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tierline_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// The exact (unrounded) amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Floors the amount at zero.
    ///
    /// ## Example
    /// ```rust
    /// use tierline_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-150).clamp_non_negative(), Money::zero());
    /// ```
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }

    /// The amount rounded to cents (half away from zero), scaled to exactly
    /// two places. Use this only at output boundaries.
    pub fn round_cents(&self) -> Decimal {
        let mut rounded = self
            .0
            .round_dp_with_strategy(OUTPUT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(OUTPUT_DECIMAL_PLACES);
        rounded
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `$12.34` / `-$1.50`, rounded to cents.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_cents();
        if rounded < Decimal::ZERO {
            write!(f, "-${}", -rounded)
        } else {
            write!(f, "${}", rounded)
        }
    }
}

impl FromStr for Money {
    type Err = CoreError;

    /// Parses `"29.99"` or `"$29.99"` (catalog prices arrive as strings).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        Decimal::from_str(digits)
            .map(Money)
            .map_err(|_| CoreError::InvalidAmount(s.to_string()))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

// Arithmetic saturates at the Decimal range instead of overflowing.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

/// Multiplication by quantity (line totals).
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }
}

/// Multiplication by a factor (percentage discounts).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0.saturating_mul(factor))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Money::new(Decimal::new(26991, 3)).to_string(), "$26.99");
        assert_eq!(Money::new(Decimal::new(2999, 3)).to_string(), "$3.00");
        assert_eq!(Money::new(Decimal::new(254915, 4)).to_string(), "$25.49");
        assert_eq!(Money::new(Decimal::new(30, 0)).to_string(), "$30.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_rounding_is_deferred() {
        // 29.99 × 0.9 stays exact until output
        let unit = Money::from_cents(2999) * Decimal::new(9, 1);
        assert_eq!(unit.amount(), Decimal::new(26991, 3));

        // 7 × 26.991 = 188.937 → $188.94; rounding the unit first gives $188.93
        let line = unit * 7;
        assert_eq!(line.to_string(), "$188.94");
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(Money::new(Decimal::new(1005, 3)).round_cents(), Decimal::new(101, 2));
        assert_eq!(Money::new(Decimal::new(-1005, 3)).round_cents(), Decimal::new(-101, 2));
    }

    #[test]
    fn test_parse() {
        assert_eq!("29.99".parse::<Money>().unwrap(), Money::from_cents(2999));
        assert_eq!(" $5 ".parse::<Money>().unwrap(), Money::from_cents(500));
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_clamp_and_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(1500);
        assert_eq!((b - a).amount(), Decimal::new(500, 2));
        assert!((a - b).is_negative());
        assert!((a - b).clamp_non_negative().is_zero());
        assert_eq!(a + b, Money::from_cents(2500));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::new(Decimal::MAX);
        let min = Money::new(Decimal::MIN);

        assert_eq!(max + Money::from_cents(100), max);
        assert_eq!(Money::from_cents(100) - min, max);
        assert_eq!(max * 2, max);
        assert_eq!(max * Decimal::new(-2, 0), min);
    }

    #[test]
    fn test_json_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("29.99").unwrap();
        let from_string: Money = serde_json::from_str("\"29.99\"").unwrap();
        assert_eq!(from_number, Money::from_cents(2999));
        assert_eq!(from_string, Money::from_cents(2999));
    }
}
