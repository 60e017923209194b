//! # Association Repository
//!
//! Links between catalog products and pricing models.
//!
//! A product may be linked to several models. The storefront resolves it to
//! one: active models win over inactive ones, then the most recently linked.
//! Unlinking only deactivates the row so history is kept.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::model::PricingModelRepository;
use tierline_core::PricingModel;

/// Repository for product → model associations of one shop.
#[derive(Debug, Clone)]
pub struct AssociationRepository {
    pool: SqlitePool,
    shop_id: String,
}

impl AssociationRepository {
    pub fn new(pool: SqlitePool, shop_id: impl Into<String>) -> Self {
        AssociationRepository {
            pool,
            shop_id: shop_id.into(),
        }
    }

    /// The model that prices `product_id` on the storefront, if any.
    pub async fn model_for_product(&self, product_id: &str) -> DbResult<Option<PricingModel>> {
        let model_id: Option<String> = sqlx::query_scalar(
            "SELECT pa.model_id
             FROM product_associations pa
             INNER JOIN pricing_models m ON m.id = pa.model_id
             WHERE m.shop_id = ?1 AND pa.product_id = ?2 AND pa.active = 1
             ORDER BY m.active DESC, pa.updated_at DESC, pa.rowid DESC
             LIMIT 1",
        )
        .bind(&self.shop_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(
            shop_id = %self.shop_id,
            product_id = %product_id,
            model_id = ?model_id,
            "Resolved product association"
        );

        match model_id {
            Some(model_id) => {
                PricingModelRepository::new(self.pool.clone(), self.shop_id.as_str())
                    .get(&model_id)
                    .await
            }
            None => Ok(None),
        }
    }

    /// Links `product_ids` to `model_id` (reactivating old links).
    ///
    /// Returns the number of products linked.
    pub async fn assign(&self, product_ids: &[String], model_id: &str) -> DbResult<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pricing_models WHERE shop_id = ?1 AND id = ?2",
        )
        .bind(&self.shop_id)
        .bind(model_id)
        .fetch_one(&mut *tx)
        .await?;

        if exists == 0 {
            return Err(DbError::not_found("PricingModel", model_id));
        }

        let linked = link_products(&mut tx, model_id, product_ids, now).await?;

        sqlx::query("UPDATE pricing_models SET updated_at = ?2 WHERE id = ?1")
            .bind(model_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(shop_id = %self.shop_id, model_id = %model_id, linked, "Products assigned");
        Ok(linked)
    }

    /// Deactivates every link of `product_ids` within this shop.
    ///
    /// Returns the number of links deactivated.
    pub async fn unassign(&self, product_ids: &[String]) -> DbResult<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut unlinked = 0;

        for product_id in product_ids {
            let result = sqlx::query(
                "UPDATE product_associations SET active = 0, updated_at = ?3
                 WHERE product_id = ?2 AND active = 1
                   AND model_id IN (SELECT id FROM pricing_models WHERE shop_id = ?1)",
            )
            .bind(&self.shop_id)
            .bind(product_id.trim())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            unlinked += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(shop_id = %self.shop_id, unlinked, "Products unassigned");
        Ok(unlinked)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Upserts active links from `model_id` to each non-blank product id.
pub(crate) async fn link_products<'a, I>(
    conn: &mut SqliteConnection,
    model_id: &str,
    product_ids: I,
    now: DateTime<Utc>,
) -> DbResult<u64>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut linked = 0;

    for product_id in product_ids {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            continue;
        }

        sqlx::query(
            "INSERT INTO product_associations (model_id, product_id, active, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT (model_id, product_id) DO UPDATE SET
                 active = 1,
                 updated_at = excluded.updated_at",
        )
        .bind(model_id)
        .bind(product_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        linked += 1;
    }

    Ok(linked)
}

/// Deactivates every link of `model_id`.
pub(crate) async fn unlink_all_products(
    conn: &mut SqliteConnection,
    model_id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        "UPDATE product_associations SET active = 0, updated_at = ?2
         WHERE model_id = ?1 AND active = 1",
    )
    .bind(model_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
