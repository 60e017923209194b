//! # Pricing Model Repository
//!
//! Persistence for pricing models and their tier sets.
//!
//! ## Atomic Tier Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    replace_tiers(model_id, tiers)                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. UPDATE pricing_models SET updated_at = ? WHERE id = ?      │   │
//! │  │     (0 rows → NotFound, nothing else runs)                     │   │
//! │  │                                                                 │   │
//! │  │  2. DELETE FROM pricing_tiers WHERE model_id = ?               │   │
//! │  │                                                                 │   │
//! │  │  3. INSERT INTO pricing_tiers ... (one row per tier)           │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← storefront readers see the old set or the new set,          │
//! │           never an empty or half-written one                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tiers are stored in input order (`sort_order`); consumers sort as needed.
//! The repository never validates: callers run the validator first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::association::{link_products, unlink_all_products};
use crate::repository::{like_pattern, ModelFilter, Page};
use tierline_core::{
    BadgeTone, DiscountType, DisplaySettings, DisplayStyle, ModelDraft, ModelUpdate, PricingModel,
    Tier, TierSet,
};

const MODEL_COLUMNS: &str = "id, shop_id, name, active, display_style, show_per_unit, \
                             show_compare_at, badge_tone, custom_copy, updated_at";

// =============================================================================
// Row Types
// =============================================================================

/// A row from `pricing_models`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ModelRow {
    id: String,
    shop_id: String,
    name: String,
    active: bool,
    display_style: String,
    show_per_unit: bool,
    show_compare_at: bool,
    badge_tone: String,
    custom_copy: Option<String>,
    updated_at: DateTime<Utc>,
}

impl ModelRow {
    fn display_settings(&self) -> DbResult<DisplaySettings> {
        let style = DisplayStyle::from_str(&self.display_style)
            .map_err(|e| DbError::corrupt("pricing_models", &self.id, e))?;
        let badge_tone = BadgeTone::from_str(&self.badge_tone)
            .map_err(|e| DbError::corrupt("pricing_models", &self.id, e))?;

        Ok(DisplaySettings {
            style,
            show_per_unit: self.show_per_unit,
            show_compare_at: self.show_compare_at,
            badge_tone,
            custom_copy: self.custom_copy.clone(),
        })
    }
}

/// A row from `pricing_tiers`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct TierRow {
    id: String,
    min_qty: i64,
    max_qty: Option<i64>,
    discount_type: String,
    discount_value: String,
}

impl TierRow {
    fn into_tier(self) -> DbResult<Tier> {
        let discount_type = DiscountType::from_str(&self.discount_type)
            .map_err(|e| DbError::corrupt("pricing_tiers", &self.id, e))?;
        let discount_value = Decimal::from_str(&self.discount_value)
            .map_err(|e| DbError::corrupt("pricing_tiers", &self.id, e))?;

        Ok(Tier::new(self.min_qty, self.max_qty, discount_type, discount_value).with_id(self.id))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for pricing models of one shop.
///
/// ## Usage
/// ```rust,ignore
/// let models = db.models("acme.myshopify.com");
///
/// let model = models.insert(&draft).await?;
/// let model = models.replace_tiers(&model.id, &new_tiers).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PricingModelRepository {
    pool: SqlitePool,
    shop_id: String,
}

impl PricingModelRepository {
    pub fn new(pool: SqlitePool, shop_id: impl Into<String>) -> Self {
        PricingModelRepository {
            pool,
            shop_id: shop_id.into(),
        }
    }

    pub fn shop_id(&self) -> &str {
        &self.shop_id
    }

    /// Inserts a model with its tiers and product links in one transaction.
    ///
    /// Tiers without an id (or with a duplicate id) get a fresh UUID.
    pub async fn insert(&self, draft: &ModelDraft) -> DbResult<PricingModel> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(shop_id = %self.shop_id, model_id = %id, "Inserting pricing model");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO pricing_models (
                id, shop_id, name, active,
                display_style, show_per_unit, show_compare_at, badge_tone, custom_copy,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        )
        .bind(&id)
        .bind(&self.shop_id)
        .bind(draft.name.trim())
        .bind(draft.active)
        .bind(draft.display.style)
        .bind(draft.display.show_per_unit)
        .bind(draft.display.show_compare_at)
        .bind(draft.display.badge_tone)
        .bind(draft.display.custom_copy.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        write_tiers(&mut tx, &id, &draft.tiers).await?;
        link_products(&mut tx, &id, &draft.product_ids, now).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            shop_id = %self.shop_id,
            model_id = %id,
            tiers = draft.tiers.len(),
            products = draft.product_ids.len(),
            "Pricing model created"
        );

        self.require(&id).await
    }

    /// Gets a model by id.
    ///
    /// ## Returns
    /// * `Ok(Some(model))` - found in this shop
    /// * `Ok(None)` - unknown id, or the model belongs to another shop
    pub async fn get(&self, id: &str) -> DbResult<Option<PricingModel>> {
        debug!(shop_id = %self.shop_id, model_id = %id, "Fetching pricing model");

        let sql = format!(
            "SELECT {} FROM pricing_models WHERE shop_id = ?1 AND id = ?2",
            MODEL_COLUMNS
        );
        let row: Option<ModelRow> = sqlx::query_as(&sql)
            .bind(&self.shop_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get), but a missing model is an error.
    pub async fn require(&self, id: &str) -> DbResult<PricingModel> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("PricingModel", id))
    }

    /// Lists models, most recently updated first.
    pub async fn list(&self, filter: &ModelFilter) -> DbResult<Page<PricingModel>> {
        let pattern = filter.normalized_query().map(|q| like_pattern(&q));
        let active = filter.status.as_flag();
        let page = filter.effective_page();
        let limit = filter.effective_limit();

        debug!(
            shop_id = %self.shop_id,
            query = ?pattern,
            active = ?active,
            page,
            limit,
            "Listing pricing models"
        );

        let total: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM pricing_models
              WHERE shop_id = ?1
                AND (?2 IS NULL OR LOWER(name) LIKE ?2 ESCAPE '\')
                AND (?3 IS NULL OR active = ?3)",
        )
        .bind(&self.shop_id)
        .bind(pattern.as_deref())
        .bind(active)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r"SELECT {} FROM pricing_models
              WHERE shop_id = ?1
                AND (?2 IS NULL OR LOWER(name) LIKE ?2 ESCAPE '\')
                AND (?3 IS NULL OR active = ?3)
              ORDER BY updated_at DESC, rowid DESC
              LIMIT ?4 OFFSET ?5",
            MODEL_COLUMNS
        );
        let rows: Vec<ModelRow> = sqlx::query_as(&sql)
            .bind(&self.shop_id)
            .bind(pattern.as_deref())
            .bind(active)
            .bind(i64::from(limit))
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.hydrate(row).await?);
        }

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }

    /// Number of models in this shop.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pricing_models WHERE shop_id = ?1")
            .bind(&self.shop_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Applies a partial update in one transaction.
    ///
    /// `display` replaces all display settings; `product_ids` replaces the
    /// model's product links; `tiers` replaces the tier set.
    pub async fn update(&self, id: &str, update: &ModelUpdate) -> DbResult<PricingModel> {
        let now = Utc::now();
        let display = update.display.as_ref();

        debug!(shop_id = %self.shop_id, model_id = %id, "Updating pricing model");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE pricing_models SET
                name            = COALESCE(?3, name),
                active          = COALESCE(?4, active),
                display_style   = COALESCE(?5, display_style),
                show_per_unit   = COALESCE(?6, show_per_unit),
                show_compare_at = COALESCE(?7, show_compare_at),
                badge_tone      = COALESCE(?8, badge_tone),
                custom_copy     = CASE WHEN ?9 THEN ?10 ELSE custom_copy END,
                updated_at      = ?11
            WHERE shop_id = ?1 AND id = ?2",
        )
        .bind(&self.shop_id)
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.active)
        .bind(display.map(|d| d.style))
        .bind(display.map(|d| d.show_per_unit))
        .bind(display.map(|d| d.show_compare_at))
        .bind(display.map(|d| d.badge_tone))
        .bind(display.is_some())
        .bind(display.and_then(|d| d.custom_copy.as_deref()))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PricingModel", id));
        }

        if let Some(product_ids) = &update.product_ids {
            unlink_all_products(&mut tx, id, now).await?;
            link_products(&mut tx, id, product_ids, now).await?;
        }

        if let Some(tiers) = &update.tiers {
            write_tiers(&mut tx, id, tiers).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(shop_id = %self.shop_id, model_id = %id, "Pricing model updated");

        self.require(id).await
    }

    /// Replaces the whole tier set atomically and bumps `updated_at`.
    pub async fn replace_tiers(&self, id: &str, tiers: &[Tier]) -> DbResult<PricingModel> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch(&mut tx, &self.shop_id, id, now).await?;
        write_tiers(&mut tx, id, tiers).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            shop_id = %self.shop_id,
            model_id = %id,
            tiers = tiers.len(),
            "Tier set replaced"
        );

        self.require(id).await
    }

    /// Activates or deactivates a model.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<PricingModel> {
        let result = sqlx::query(
            "UPDATE pricing_models SET active = ?3, updated_at = ?4
             WHERE shop_id = ?1 AND id = ?2",
        )
        .bind(&self.shop_id)
        .bind(id)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PricingModel", id));
        }

        info!(shop_id = %self.shop_id, model_id = %id, active, "Pricing model status changed");

        self.require(id).await
    }

    /// Deletes a model; tiers and product links cascade.
    ///
    /// Returns the model as it was before deletion.
    pub async fn delete(&self, id: &str) -> DbResult<PricingModel> {
        let model = self.require(id).await?;

        sqlx::query("DELETE FROM pricing_models WHERE shop_id = ?1 AND id = ?2")
            .bind(&self.shop_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(shop_id = %self.shop_id, model_id = %id, "Pricing model deleted");

        Ok(model)
    }

    /// Copies a model as `<name> (Copy)`, inactive, with the same tiers,
    /// products and display settings.
    pub async fn duplicate(&self, id: &str) -> DbResult<PricingModel> {
        let source = self.require(id).await?;

        let mut draft = source.to_draft();
        draft.name = format!("{} (Copy)", source.name);
        draft.active = false;
        for tier in &mut draft.tiers {
            tier.id = None;
        }

        debug!(shop_id = %self.shop_id, source_id = %id, "Duplicating pricing model");

        self.insert(&draft).await
    }

    /// Attaches tiers and product ids to a model row.
    async fn hydrate(&self, row: ModelRow) -> DbResult<PricingModel> {
        let tier_rows: Vec<TierRow> = sqlx::query_as(
            "SELECT id, min_qty, max_qty, discount_type, discount_value
             FROM pricing_tiers
             WHERE model_id = ?1
             ORDER BY sort_order",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let tiers = tier_rows
            .into_iter()
            .map(TierRow::into_tier)
            .collect::<DbResult<TierSet>>()?;

        let product_ids: Vec<String> = sqlx::query_scalar(
            "SELECT product_id FROM product_associations
             WHERE model_id = ?1 AND active = 1
             ORDER BY product_id",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let display = row.display_settings()?;

        Ok(PricingModel {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            product_ids: product_ids.into_iter().collect::<BTreeSet<_>>(),
            tiers,
            display,
            active: row.active,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Bumps `updated_at`; fails with NotFound when the model is not in the shop.
async fn touch(
    conn: &mut SqliteConnection,
    shop_id: &str,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE pricing_models SET updated_at = ?3 WHERE shop_id = ?1 AND id = ?2")
        .bind(shop_id)
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("PricingModel", id));
    }

    Ok(())
}

/// Deletes the model's tiers and writes `tiers` in their place.
async fn write_tiers(conn: &mut SqliteConnection, model_id: &str, tiers: &[Tier]) -> DbResult<()> {
    sqlx::query("DELETE FROM pricing_tiers WHERE model_id = ?1")
        .bind(model_id)
        .execute(&mut *conn)
        .await?;

    let mut seen: HashSet<String> = HashSet::with_capacity(tiers.len());

    for (sort_order, tier) in tiers.iter().enumerate() {
        let tier_id = match &tier.id {
            Some(id) if !id.trim().is_empty() && seen.insert(id.clone()) => id.clone(),
            _ => Uuid::new_v4().to_string(),
        };

        sqlx::query(
            "INSERT INTO pricing_tiers (
                model_id, id, sort_order, min_qty, max_qty, discount_type, discount_value
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(model_id)
        .bind(&tier_id)
        .bind(sort_order as i64)
        .bind(tier.min_qty)
        .bind(tier.max_qty)
        .bind(tier.discount_type)
        .bind(tier.discount_value.to_string())
        .execute(&mut *conn)
        .await?;
    }

    debug!(model_id = %model_id, count = tiers.len(), "Tiers written");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
