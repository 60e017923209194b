//! # Storefront Service
//!
//! Customer-facing reads. Nothing here writes pricing data; only the
//! display cache is filled.
//!
//! ```text
//!   display(p1) ──► cache hit? ──► payload
//!                       │ miss
//!                       ▼
//!                 model_for_product(p1) ──► DisplayPayload ──► cache.put
//!
//!   quote(p1, 7) ──► catalog.lookup(p1) ──► model_for_product(p1)
//!                                              │
//!                         active model ────────┴──── none / inactive
//!                             │                            │
//!                 resolve + price (tier)          list price, no savings
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogProduct};
use crate::config::StoreConfig;
use crate::pool::Database;
use crate::service::{ServiceError, ServiceResult};
use tierline_core::{
    best_offer, price, quote, tier_offers, CoreError, DisplayPayload, Money, PricingModel,
    ResolvedPrice, Tier, TierOffer,
};

/// Default cache lifetime for display payloads.
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// Price of `quantity` units of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuote {
    pub product_id: String,
    pub title: String,
    pub quantity: u32,
    /// Name of the model that priced the quote, if one applied.
    pub model_name: Option<String>,
    pub tier: Option<Tier>,
    pub list_price: Money,
    pub unit_price: Money,
    pub savings_per_unit: Money,
    pub savings_percent: Decimal,
    pub line_total: Money,
    pub savings_total: Money,
}

impl ProductQuote {
    fn new(
        product: CatalogProduct,
        quantity: u32,
        model_name: Option<String>,
        resolved: ResolvedPrice,
    ) -> Self {
        ProductQuote {
            line_total: resolved.line_total(quantity),
            savings_total: resolved.savings_total(quantity),
            product_id: product.id,
            title: product.title,
            quantity,
            model_name,
            tier: resolved.tier,
            list_price: product.price,
            unit_price: resolved.unit_price,
            savings_per_unit: resolved.savings_per_unit,
            savings_percent: resolved.savings_percent,
        }
    }

    pub fn is_discounted(&self) -> bool {
        !self.savings_per_unit.is_zero()
    }
}

/// Every tier of a product priced at its list price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOffers {
    pub product_id: String,
    pub list_price: Money,
    pub offers: Vec<TierOffer>,
    pub best: Option<TierOffer>,
}

/// Storefront reads for one shop.
pub struct StorefrontService<C: Catalog> {
    db: Database,
    shop_id: String,
    catalog: C,
    cache_ttl_hours: i64,
}

impl<C: Catalog> StorefrontService<C> {
    pub fn new(db: Database, shop_id: impl Into<String>, catalog: C) -> Self {
        StorefrontService {
            db,
            shop_id: shop_id.into(),
            catalog,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
        }
    }

    /// Shop and cache lifetime taken from `config`.
    pub fn from_config(db: Database, config: &StoreConfig, catalog: C) -> Self {
        Self::new(db, config.shop_id.as_str(), catalog).with_cache_ttl(config.cache_ttl_hours)
    }

    pub fn with_cache_ttl(mut self, hours: i64) -> Self {
        self.cache_ttl_hours = hours;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Display payload for `product_id`.
    ///
    /// Products without an active model get [`DisplayPayload::inactive`].
    pub async fn display(&self, product_id: &str) -> ServiceResult<DisplayPayload> {
        let cache = self.db.cache(&self.shop_id);

        if let Some(payload) = cache.get(product_id).await? {
            return Ok(payload);
        }

        let payload = match self.pricing_model(product_id).await? {
            Some(model) => DisplayPayload::from_model(&model),
            None => DisplayPayload::inactive(),
        };

        cache.put(product_id, &payload, self.cache_ttl_hours).await?;
        Ok(payload)
    }

    /// Prices `quantity` units of `product_id`.
    pub async fn quote(&self, product_id: &str, quantity: u32) -> ServiceResult<ProductQuote> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity.into());
        }

        let product = self.product(product_id).await?;

        let (model_name, resolved) = match self.pricing_model(product_id).await? {
            Some(model) if model.active => {
                let resolved = quote(&model, product.price, quantity)?;
                (Some(model.name), resolved)
            }
            _ => (None, price(None, product.price)),
        };

        debug!(
            shop_id = %self.shop_id,
            product_id = %product_id,
            quantity,
            unit_price = %resolved.unit_price,
            "Quoted product"
        );

        Ok(ProductQuote::new(product, quantity, model_name, resolved))
    }

    /// Every tier of the product's active model priced at its list price.
    pub async fn offers(&self, product_id: &str) -> ServiceResult<ProductOffers> {
        let product = self.product(product_id).await?;

        let tiers: Vec<Tier> = match self.pricing_model(product_id).await? {
            Some(model) if model.active => model.tiers.into_inner(),
            _ => Vec::new(),
        };

        Ok(ProductOffers {
            offers: tier_offers(&tiers, product.price),
            best: best_offer(&tiers, product.price),
            product_id: product.id,
            list_price: product.price,
        })
    }

    async fn product(&self, product_id: &str) -> ServiceResult<CatalogProduct> {
        match self.catalog.lookup(product_id).await? {
            Some(product) => Ok(product),
            None => {
                warn!(shop_id = %self.shop_id, product_id = %product_id, "Product not in catalog");
                Err(ServiceError::ProductNotFound(product_id.to_string()))
            }
        }
    }

    async fn pricing_model(&self, product_id: &str) -> ServiceResult<Option<PricingModel>> {
        Ok(self.db.associations(&self.shop_id).model_for_product(product_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
