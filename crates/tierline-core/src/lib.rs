//! # tierline-core: Pure Tiered-Quantity Pricing Logic
//!
//! This crate is the **heart** of Tierline. It contains the pricing engine
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tierline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Admin surface              Storefront surface            │   │
//! │  │   validate ─► persist        resolve ─► price ─► display        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tierline-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌───────────┐        │   │
//! │  │  │ validation │ │ resolve  │ │ pricing  │ │  summary  │        │   │
//! │  │  │  overlap   │ │ highest  │ │ PERCENT  │ │ "5-9 → …" │        │   │
//! │  │  │  checks    │ │ floor    │ │ AMOUNT   │ │           │        │   │
//! │  │  │            │ │ wins     │ │ FIXED    │ │           │        │   │
//! │  │  └────────────┘ └──────────┘ └──────────┘ └───────────┘        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tierline-db (Storage Layer)                     │   │
//! │  │        SQLite models, atomic tier replace, pricing cache        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Tier, TierSet, PricingModel, ResolvedPrice, display settings
//! - [`money`] - Money type over exact decimals
//! - [`error`] - Domain error types
//! - [`validation`] - Tier Validator
//! - [`resolve`] - Tier Resolver
//! - [`pricing`] - Price Calculator
//! - [`summary`] - Summary Formatter
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tierline_core::{price, resolve, DiscountType, Money, Tier};
//!
//! let tiers = vec![
//!     Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)),
//!     Tier::new(10, None, DiscountType::Percent, Decimal::new(15, 0)),
//! ];
//! let base = Money::from_cents(2999);
//!
//! let quote = price(resolve(7, &tiers), base);
//! assert_eq!(quote.unit_price.to_string(), "$26.99");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod resolve;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, Field, ValidationError};
pub use money::Money;
pub use pricing::{best_offer, price, quote, tier_offers};
pub use resolve::resolve;
pub use summary::format_summary;
pub use types::*;
pub use validation::{ensure_valid, validate, validate_model};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length of a pricing model name after trimming whitespace.
pub const MIN_MODEL_NAME_LEN: usize = 3;

/// Upper bound for a `PERCENT` discount value.
pub const MAX_PERCENT_DISCOUNT: i64 = 100;

/// Summary text for a model without tiers.
pub const NO_TIERS_SUMMARY: &str = "No tiers configured";
