//! # Admin Service
//!
//! Configuration surface: every write validates first, and every write
//! drops the cached storefront payloads of the products it touches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::pool::Database;
use crate::repository::association::AssociationRepository;
use crate::repository::cache::PricingCacheRepository;
use crate::repository::model::PricingModelRepository;
use crate::repository::{ModelFilter, Page};
use crate::service::{ServiceError, ServiceResult};
use tierline_core::{ensure_valid, format_summary, validate_model, ModelDraft, ModelUpdate, PricingModel};

/// One row of the admin model list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListing {
    pub model: PricingModel,
    /// e.g. `5-9 → 10% off; 10+ → 15% off`
    pub summary: String,
    pub product_count: usize,
}

impl From<PricingModel> for ModelListing {
    fn from(model: PricingModel) -> Self {
        ModelListing {
            summary: format_summary(&model.tiers),
            product_count: model.product_ids.len(),
            model,
        }
    }
}

/// Admin operations for one shop.
#[derive(Debug, Clone)]
pub struct AdminService {
    db: Database,
    shop_id: String,
}

impl AdminService {
    pub fn new(db: Database, shop_id: impl Into<String>) -> Self {
        AdminService {
            db,
            shop_id: shop_id.into(),
        }
    }

    fn models(&self) -> PricingModelRepository {
        self.db.models(&self.shop_id)
    }

    fn associations(&self) -> AssociationRepository {
        self.db.associations(&self.shop_id)
    }

    fn cache(&self) -> PricingCacheRepository {
        self.db.cache(&self.shop_id)
    }

    /// Validates and stores a new model.
    ///
    /// Fails with [`ServiceError::Invalid`] listing every problem.
    pub async fn create_model(&self, draft: ModelDraft) -> ServiceResult<PricingModel> {
        let errors = validate_model(&draft);
        if !errors.is_empty() {
            warn!(
                shop_id = %self.shop_id,
                problems = errors.len(),
                "Rejected pricing model"
            );
            return Err(ServiceError::Invalid(errors));
        }

        let model = self.models().insert(&draft).await?;
        self.cache().invalidate_model(&model).await?;

        info!(shop_id = %self.shop_id, model_id = %model.id, name = %model.name, "Model saved");
        Ok(model)
    }

    pub async fn get_model(&self, id: &str) -> ServiceResult<PricingModel> {
        Ok(self.models().require(id).await?)
    }

    /// Applies `update` after validating the model it would produce.
    pub async fn update_model(&self, id: &str, update: ModelUpdate) -> ServiceResult<PricingModel> {
        let current = self.models().require(id).await?;

        if update.is_empty() {
            return Ok(current);
        }

        ensure_valid(&update.merged_with(&current))?;

        let updated = self.models().update(id, &update).await?;

        // Products dropped from the model lose their cached payload too
        let touched: BTreeSet<&String> = current
            .product_ids
            .iter()
            .chain(updated.product_ids.iter())
            .collect();
        self.cache().invalidate_products(touched).await?;

        Ok(updated)
    }

    /// Lists models with their tier summaries.
    pub async fn list_models(&self, filter: &ModelFilter) -> ServiceResult<Page<ModelListing>> {
        let page = self.models().list(filter).await?;
        Ok(page.map(ModelListing::from))
    }

    /// Flips `active`.
    pub async fn toggle_active(&self, id: &str) -> ServiceResult<PricingModel> {
        let current = self.models().require(id).await?;
        self.set_active(id, !current.active).await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> ServiceResult<PricingModel> {
        let model = self.models().set_active(id, active).await?;
        self.cache().invalidate_model(&model).await?;
        Ok(model)
    }

    /// Deletes a model with its tiers and product links.
    pub async fn delete_model(&self, id: &str) -> ServiceResult<()> {
        let model = self.models().delete(id).await?;
        self.cache().invalidate_model(&model).await?;
        Ok(())
    }

    /// Copies a model as an inactive `<name> (Copy)`.
    pub async fn duplicate_model(&self, id: &str) -> ServiceResult<PricingModel> {
        let copy = self.models().duplicate(id).await?;
        self.cache().invalidate_model(&copy).await?;
        Ok(copy)
    }

    /// Links products to a model.
    pub async fn assign_products(&self, model_id: &str, product_ids: &[String]) -> ServiceResult<u64> {
        let product_ids = normalize_product_ids(product_ids);
        let linked = self.associations().assign(&product_ids, model_id).await?;
        self.cache().invalidate_products(&product_ids).await?;
        Ok(linked)
    }

    /// Unlinks products from every model of the shop.
    pub async fn unassign_products(&self, product_ids: &[String]) -> ServiceResult<u64> {
        let product_ids = normalize_product_ids(product_ids);
        let unlinked = self.associations().unassign(&product_ids).await?;
        self.cache().invalidate_products(&product_ids).await?;
        Ok(unlinked)
    }

    /// Drops expired storefront payloads.
    pub async fn purge_cache(&self) -> ServiceResult<u64> {
        Ok(self.cache().purge_expired().await?)
    }
}

/// Trimmed, non-blank, deduplicated ids; the same keys links and cache use.
fn normalize_product_ids(product_ids: &[String]) -> Vec<String> {
    product_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
