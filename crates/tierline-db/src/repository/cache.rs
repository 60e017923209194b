//! # Pricing Cache Repository
//!
//! Storefront display payloads keyed by `(shop_id, product_id)`.
//!
//! ```text
//!   display(p1) ──► get(p1) ── hit ──► payload
//!                      │
//!                     miss / expired / corrupt
//!                      │
//!                      ▼
//!              build from model ──► put(p1, payload, ttl)
//!
//!   any admin write ──► invalidate_products(model.product_ids)
//! ```
//!
//! `expires_at` is stored as unix seconds; an entry is live while
//! `expires_at > now`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use tierline_core::{DisplayPayload, PricingModel};

const SECONDS_PER_HOUR: i64 = 3600;

/// Repository for cached storefront payloads of one shop.
#[derive(Debug, Clone)]
pub struct PricingCacheRepository {
    pool: SqlitePool,
    shop_id: String,
}

impl PricingCacheRepository {
    pub fn new(pool: SqlitePool, shop_id: impl Into<String>) -> Self {
        PricingCacheRepository {
            pool,
            shop_id: shop_id.into(),
        }
    }

    /// Returns the live payload for `product_id`.
    ///
    /// A row that no longer decodes is dropped and reported as a miss.
    pub async fn get(&self, product_id: &str) -> DbResult<Option<DisplayPayload>> {
        let payload: Option<String> = sqlx::query_scalar(
            "SELECT payload FROM pricing_cache
             WHERE shop_id = ?1 AND product_id = ?2 AND expires_at > ?3",
        )
        .bind(&self.shop_id)
        .bind(product_id)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        let Some(payload) = payload else {
            debug!(shop_id = %self.shop_id, product_id = %product_id, "Pricing cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(decoded) => {
                debug!(shop_id = %self.shop_id, product_id = %product_id, "Pricing cache hit");
                Ok(Some(decoded))
            }
            Err(e) => {
                warn!(
                    shop_id = %self.shop_id,
                    product_id = %product_id,
                    error = %e,
                    "Discarding corrupt pricing cache entry"
                );
                self.invalidate_products([product_id]).await?;
                Ok(None)
            }
        }
    }

    /// Stores `payload` for `ttl_hours` (replacing any existing entry).
    pub async fn put(&self, product_id: &str, payload: &DisplayPayload, ttl_hours: i64) -> DbResult<()> {
        let json = serde_json::to_string(payload)
            .map_err(|e| DbError::Internal(format!("Cannot encode display payload: {}", e)))?;
        let expires_at = Utc::now()
            .timestamp()
            .saturating_add(ttl_hours.saturating_mul(SECONDS_PER_HOUR));

        sqlx::query(
            "INSERT INTO pricing_cache (shop_id, product_id, payload, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (shop_id, product_id) DO UPDATE SET
                 payload = excluded.payload,
                 expires_at = excluded.expires_at",
        )
        .bind(&self.shop_id)
        .bind(product_id)
        .bind(json)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        debug!(shop_id = %self.shop_id, product_id = %product_id, expires_at, "Pricing cached");
        Ok(())
    }

    /// Drops cached payloads for `product_ids`. Returns rows removed.
    pub async fn invalidate_products<I, S>(&self, product_ids: I) -> DbResult<u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;

        for product_id in product_ids {
            let result = sqlx::query("DELETE FROM pricing_cache WHERE shop_id = ?1 AND product_id = ?2")
                .bind(&self.shop_id)
                .bind(product_id.as_ref())
                .execute(&self.pool)
                .await?;
            removed += result.rows_affected();
        }

        if removed > 0 {
            debug!(shop_id = %self.shop_id, removed, "Pricing cache invalidated");
        }
        Ok(removed)
    }

    /// Drops cached payloads for every product of `model`.
    pub async fn invalidate_model(&self, model: &PricingModel) -> DbResult<u64> {
        self.invalidate_products(&model.product_ids).await
    }

    /// Deletes expired entries of this shop. Returns rows removed.
    pub async fn purge_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM pricing_cache WHERE shop_id = ?1 AND expires_at <= ?2")
            .bind(&self.shop_id)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn payload(name: &str) -> DisplayPayload {
        DisplayPayload {
            active: true,
            name: Some(name.to_string()),
            ..DisplayPayload::inactive()
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache("shop-a");

        assert!(cache.get("p1").await.unwrap().is_none());

        cache.put("p1", &payload("Bulk"), 24).await.unwrap();
        assert_eq!(cache.get("p1").await.unwrap(), Some(payload("Bulk")));

        // Upsert replaces
        cache.put("p1", &payload("Bulk v2"), 24).await.unwrap();
        assert_eq!(cache.get("p1").await.unwrap(), Some(payload("Bulk v2")));

        // Other shops never see it
        assert!(db.cache("shop-b").get("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_miss_and_purge() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache("shop-a");

        cache.put("p1", &payload("Bulk"), 0).await.unwrap();
        cache.put("p2", &payload("Bulk"), 24).await.unwrap();

        assert!(cache.get("p1").await.unwrap().is_none());
        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(cache.get("p2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache("shop-a");
        cache.put("p1", &payload("Bulk"), 24).await.unwrap();
        cache.put("p2", &payload("Bulk"), 24).await.unwrap();

        assert_eq!(cache.invalidate_products(["p1", "p3"]).await.unwrap(), 1);
        assert!(cache.get("p1").await.unwrap().is_none());
        assert!(cache.get("p2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_discarded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache("shop-a");
        cache.put("p1", &payload("Bulk"), 24).await.unwrap();

        sqlx::query("UPDATE pricing_cache SET payload = '{not json'")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(cache.get("p1").await.unwrap().is_none());
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pricing_cache")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
