//! # Domain Types
//!
//! Core domain types used throughout Tierline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PricingModel   │   │    TierSet      │   │      Tier       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, shop_id    │──►│  Vec<Tier>      │──►│  min_qty        │       │
//! │  │  name           │   │  replaced       │   │  max_qty?       │       │
//! │  │  product_ids    │   │  wholesale      │   │  discount_type  │       │
//! │  │  display        │   └─────────────────┘   │  discount_value │       │
//! │  │  active         │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountType   │   │  ResolvedPrice  │   │ DisplaySettings │       │
//! │  │  PERCENT        │   │  (derived, not  │   │  passed through │       │
//! │  │  AMOUNT         │   │   persisted)    │   │  unmodified     │       │
//! │  │  FIXED_PRICE    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Discount Type
// =============================================================================

/// How a tier's `discount_value` is applied to the base price.
///
/// ## Legacy Spellings
/// Older admin forms sent `FIXED` ("Fixed Amount") for an amount off, and
/// the per-product editor used lowercase `amount` / `percentage`. These are
/// accepted on input and always written back canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `discount_value` percent off the base price.
    #[serde(alias = "percentage", alias = "percent")]
    Percent,
    /// `discount_value` currency units off the base price.
    #[serde(alias = "FIXED", alias = "amount", alias = "fixed")]
    Amount,
    /// `discount_value` is the absolute unit price.
    #[serde(alias = "fixed_price")]
    FixedPrice,
}

impl DiscountType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "PERCENT",
            DiscountType::Amount => "AMOUNT",
            DiscountType::FixedPrice => "FIXED_PRICE",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PERCENT" | "percent" | "percentage" => Ok(DiscountType::Percent),
            "AMOUNT" | "amount" | "FIXED" | "fixed" => Ok(DiscountType::Amount),
            "FIXED_PRICE" | "fixed_price" => Ok(DiscountType::FixedPrice),
            other => Err(CoreError::UnknownDiscountType(other.to_string())),
        }
    }
}

// =============================================================================
// Quantity Range
// =============================================================================

/// The quantities a tier covers: `[min, max]`, or `[min, ∞)` when open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRange {
    pub min: i64,
    pub max: Option<i64>,
}

impl QuantityRange {
    /// Upper bound with open-ended ranges treated as +∞.
    #[inline]
    pub fn end(&self) -> i64 {
        self.max.unwrap_or(i64::MAX)
    }

    #[inline]
    pub fn contains(&self, quantity: i64) -> bool {
        quantity >= self.min && self.max.map_or(true, |max| quantity <= max)
    }

    /// Closed-interval overlap: `startA ≤ endB && startB ≤ endA`.
    #[inline]
    pub fn overlaps(&self, other: &QuantityRange) -> bool {
        self.min <= other.end() && other.min <= self.end()
    }
}

/// `5-9` or `10+`.
impl fmt::Display for QuantityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

// =============================================================================
// Tier
// =============================================================================

/// One quantity-bounded discount rule.
///
/// Quantities are signed so that malformed input (`minQty: 0`, `-3`, or a
/// missing field) survives deserialisation and is reported by the validator
/// rather than rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Unique within a model; assigned by storage when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<String>,

    #[serde(default)]
    pub min_qty: i64,

    /// `None` = open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_qty: Option<i64>,

    pub discount_type: DiscountType,

    #[serde(default)]
    #[ts(as = "String")]
    pub discount_value: Decimal,
}

impl Tier {
    /// Creates a tier without an id.
    pub fn new(
        min_qty: i64,
        max_qty: Option<i64>,
        discount_type: DiscountType,
        discount_value: Decimal,
    ) -> Self {
        Tier {
            id: None,
            min_qty,
            max_qty,
            discount_type,
            discount_value,
        }
    }

    /// Sets the tier id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[inline]
    pub fn range(&self) -> QuantityRange {
        QuantityRange {
            min: self.min_qty,
            max: self.max_qty,
        }
    }

    /// Whether the tier applies to `quantity`.
    #[inline]
    pub fn covers(&self, quantity: i64) -> bool {
        self.range().contains(quantity)
    }

    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.max_qty.is_none()
    }
}

// =============================================================================
// Tier Set
// =============================================================================

/// The full collection of tiers for one pricing model.
///
/// A `TierSet` is only ever built wholesale from a `Vec<Tier>`; there are no
/// per-tier mutators. Edits replace the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct TierSet(Vec<Tier>);

impl TierSet {
    pub fn new(tiers: Vec<Tier>) -> Self {
        TierSet(tiers)
    }

    /// Tiers ordered by `min_qty` ascending (stable for equal floors).
    pub fn sorted_ascending(&self) -> Vec<&Tier> {
        let mut sorted: Vec<&Tier> = self.0.iter().collect();
        sorted.sort_by_key(|tier| tier.min_qty);
        sorted
    }

    pub fn into_inner(self) -> Vec<Tier> {
        self.0
    }
}

impl Deref for TierSet {
    type Target = [Tier];

    fn deref(&self) -> &[Tier] {
        &self.0
    }
}

impl From<Vec<Tier>> for TierSet {
    fn from(tiers: Vec<Tier>) -> Self {
        TierSet(tiers)
    }
}

impl FromIterator<Tier> for TierSet {
    fn from_iter<I: IntoIterator<Item = Tier>>(iter: I) -> Self {
        TierSet(iter.into_iter().collect())
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// Storefront layout preset. Presentation only; the engine never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayStyle {
    #[default]
    BadgeRow,
    TierTable,
    InlineBanner,
    Slider,
    Dropdown,
    Grid,
}

impl FromStr for DisplayStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BADGE_ROW" => Ok(DisplayStyle::BadgeRow),
            "TIER_TABLE" => Ok(DisplayStyle::TierTable),
            "INLINE_BANNER" => Ok(DisplayStyle::InlineBanner),
            "SLIDER" => Ok(DisplayStyle::Slider),
            "DROPDOWN" => Ok(DisplayStyle::Dropdown),
            "GRID" => Ok(DisplayStyle::Grid),
            other => Err(CoreError::UnknownDisplayStyle(other.to_string())),
        }
    }
}

/// Badge colour family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    #[default]
    Success,
    Attention,
    Info,
    Subdued,
}

impl FromStr for BadgeTone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "success" => Ok(BadgeTone::Success),
            "attention" => Ok(BadgeTone::Attention),
            "info" => Ok(BadgeTone::Info),
            "subdued" => Ok(BadgeTone::Subdued),
            other => Err(CoreError::UnknownBadgeTone(other.to_string())),
        }
    }
}

/// Storefront presentation knobs, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub style: DisplayStyle,
    pub show_per_unit: bool,
    pub show_compare_at: bool,
    pub badge_tone: BadgeTone,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub custom_copy: Option<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            style: DisplayStyle::BadgeRow,
            show_per_unit: true,
            show_compare_at: false,
            badge_tone: BadgeTone::Success,
            custom_copy: None,
        }
    }
}

// =============================================================================
// Pricing Model
// =============================================================================

/// A named set of tiers applied to a group of products within one shop.
///
/// Owns its [`TierSet`] exclusively. `active` gates customer-facing pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingModel {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub product_ids: BTreeSet<String>,
    pub tiers: TierSet,
    pub display: DisplaySettings,
    pub active: bool,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl PricingModel {
    #[inline]
    pub fn display_style(&self) -> DisplayStyle {
        self.display.style
    }

    /// The model's editable fields as a draft (for re-validation or copying).
    pub fn to_draft(&self) -> ModelDraft {
        ModelDraft {
            name: self.name.clone(),
            product_ids: self.product_ids.clone(),
            tiers: self.tiers.to_vec(),
            display: self.display.clone(),
            active: self.active,
        }
    }
}

/// Admin input for a new model, before an id and timestamp are assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ModelDraft {
    pub name: String,
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
    #[serde(default)]
    pub tiers: Vec<Tier>,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub active: bool,
}

/// Partial edit of a model. `tiers`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelUpdate {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(optional)]
    pub product_ids: Option<BTreeSet<String>>,
    #[ts(optional)]
    pub tiers: Option<Vec<Tier>>,
    #[ts(optional)]
    pub display: Option<DisplaySettings>,
    #[ts(optional)]
    pub active: Option<bool>,
}

impl ModelUpdate {
    /// The draft that results from applying this update to `model`.
    pub fn merged_with(&self, model: &PricingModel) -> ModelDraft {
        let mut draft = model.to_draft();
        if let Some(name) = &self.name {
            draft.name = name.clone();
        }
        if let Some(product_ids) = &self.product_ids {
            draft.product_ids = product_ids.clone();
        }
        if let Some(tiers) = &self.tiers {
            draft.tiers = tiers.clone();
        }
        if let Some(display) = &self.display {
            draft.display = display.clone();
        }
        if let Some(active) = self.active {
            draft.active = active;
        }
        draft
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.product_ids.is_none()
            && self.tiers.is_none()
            && self.display.is_none()
            && self.active.is_none()
    }
}

// =============================================================================
// Resolved Price
// =============================================================================

/// Derived, non-persisted pricing result for one unit.
///
/// Amounts are exact; round with [`Money::round_cents`] or `Display` only when
/// showing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    pub tier: Option<Tier>,
    #[ts(as = "String")]
    pub unit_price: Money,
    #[ts(as = "String")]
    pub savings_per_unit: Money,
    #[ts(as = "String")]
    pub savings_percent: Decimal,
}

impl ResolvedPrice {
    /// `unit_price × quantity`.
    pub fn line_total(&self, quantity: u32) -> Money {
        self.unit_price * quantity
    }

    /// `savings_per_unit × quantity`.
    pub fn savings_total(&self, quantity: u32) -> Money {
        self.savings_per_unit * quantity
    }

    /// Whether any discount applied.
    pub fn is_discounted(&self) -> bool {
        !self.savings_per_unit.is_zero()
    }
}

/// What one tier is worth at a given base price, for ladder-style displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TierOffer {
    pub min_qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_qty: Option<i64>,
    /// Summary label, e.g. `10% off`.
    pub label: String,
    #[ts(as = "String")]
    pub unit_price: Money,
    #[ts(as = "String")]
    pub savings_per_unit: Money,
    #[ts(as = "String")]
    pub savings_percent: Decimal,
}

// =============================================================================
// Display Payload
// =============================================================================

/// What the storefront script receives for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPayload {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    pub tiers: Vec<Tier>,
    pub summary: String,
    pub display_settings: DisplaySettings,
}

impl DisplayPayload {
    /// Payload for products without an active model.
    pub fn inactive() -> Self {
        DisplayPayload {
            active: false,
            name: None,
            tiers: Vec::new(),
            summary: crate::NO_TIERS_SUMMARY.to_string(),
            display_settings: DisplaySettings::default(),
        }
    }

    /// Payload for `model`. An inactive model looks exactly like no model;
    /// tier ids are internal and are stripped.
    pub fn from_model(model: &PricingModel) -> Self {
        if !model.active {
            return DisplayPayload::inactive();
        }

        let tiers: Vec<Tier> = model
            .tiers
            .sorted_ascending()
            .into_iter()
            .map(|tier| Tier {
                id: None,
                ..tier.clone()
            })
            .collect();

        DisplayPayload {
            active: true,
            name: Some(model.name.clone()),
            summary: crate::summary::format_summary(&tiers),
            tiers,
            display_settings: model.display.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model(active: bool) -> PricingModel {
        PricingModel {
            id: "m1".to_string(),
            shop_id: "shop".to_string(),
            name: "Bulk Coffee".to_string(),
            product_ids: BTreeSet::from(["p1".to_string()]),
            tiers: TierSet::new(vec![
                Tier::new(10, None, DiscountType::Percent, Decimal::new(15, 0)).with_id("t2"),
                Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)).with_id("t1"),
            ]),
            display: DisplaySettings::default(),
            active,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_discount_type_legacy_spellings() {
        let parsed: DiscountType = serde_json::from_str("\"FIXED\"").unwrap();
        assert_eq!(parsed, DiscountType::Amount);
        let parsed: DiscountType = serde_json::from_str("\"percentage\"").unwrap();
        assert_eq!(parsed, DiscountType::Percent);
        assert_eq!("amount".parse::<DiscountType>().unwrap(), DiscountType::Amount);
        assert_eq!(
            serde_json::to_string(&DiscountType::FixedPrice).unwrap(),
            "\"FIXED_PRICE\""
        );
        assert!("BOGO".parse::<DiscountType>().is_err());
    }

    #[test]
    fn test_quantity_range() {
        let bounded = QuantityRange { min: 5, max: Some(9) };
        assert!(bounded.contains(5));
        assert!(bounded.contains(9));
        assert!(!bounded.contains(10));
        assert_eq!(bounded.to_string(), "5-9");

        let open = QuantityRange { min: 10, max: None };
        assert!(open.contains(1_000_000));
        assert_eq!(open.to_string(), "10+");

        assert!(!bounded.overlaps(&open));
        assert!(QuantityRange { min: 9, max: None }.overlaps(&bounded));
    }

    #[test]
    fn test_tier_interchange_shape() {
        let json = r#"{"minQty": 5, "maxQty": 9, "discountType": "PERCENT", "discountValue": 10}"#;
        let tier: Tier = serde_json::from_str(json).unwrap();
        assert_eq!(tier.min_qty, 5);
        assert_eq!(tier.max_qty, Some(9));
        assert_eq!(tier.discount_value, Decimal::new(10, 0));
        assert!(tier.id.is_none());

        let open: Tier =
            serde_json::from_str(r#"{"minQty": 10, "discountType": "AMOUNT", "discountValue": "2.50"}"#)
                .unwrap();
        assert!(open.is_open_ended());
        let out = serde_json::to_value(&open).unwrap();
        assert!(out.get("maxQty").is_none());
        assert!(out.get("id").is_none());
        assert_eq!(out["discountType"], "AMOUNT");
    }

    #[test]
    fn test_missing_min_qty_defaults_to_zero() {
        let tier: Tier =
            serde_json::from_str(r#"{"discountType": "PERCENT", "discountValue": 5}"#).unwrap();
        assert_eq!(tier.min_qty, 0);
    }

    #[test]
    fn test_display_settings_defaults() {
        let settings: DisplaySettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, DisplaySettings::default());
        assert!(settings.show_per_unit);
        assert_eq!(settings.badge_tone, BadgeTone::Success);
    }

    #[test]
    fn test_model_update_merge() {
        let model = sample_model(true);
        let update = ModelUpdate {
            name: Some("Renamed".to_string()),
            active: Some(false),
            ..ModelUpdate::default()
        };
        let draft = update.merged_with(&model);
        assert_eq!(draft.name, "Renamed");
        assert!(!draft.active);
        assert_eq!(draft.tiers.len(), 2);
        assert!(ModelUpdate::default().is_empty());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_display_payload_for_active_model() {
        let payload = DisplayPayload::from_model(&sample_model(true));
        assert!(payload.active);
        assert_eq!(payload.tiers[0].min_qty, 5);
        assert!(payload.tiers.iter().all(|t| t.id.is_none()));
        assert_eq!(payload.summary, "5-9 → 10% off; 10+ → 15% off");
    }

    #[test]
    fn test_display_payload_hides_tiers_of_inactive_model() {
        let payload = DisplayPayload::from_model(&sample_model(false));
        assert!(!payload.active);
        assert!(payload.tiers.is_empty());
        assert!(payload.name.is_none());
        assert_eq!(payload, DisplayPayload::inactive());
    }
}
