//! # Catalog Seam
//!
//! Read-only product lookup (id → title, list price). The storefront quote
//! needs a base price; where it comes from is outside this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::RwLock;

use tierline_core::Money;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: String,
    pub title: String,
    pub price: Money,
}

impl CatalogProduct {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Money) -> Self {
        CatalogProduct {
            id: id.into(),
            title: title.into(),
            price,
        }
    }
}

/// Catalog lookup failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid price for product {product_id}: {raw}")]
    InvalidPrice { product_id: String, raw: String },
}

/// Product lookup used by the storefront service.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// `Ok(None)` when the product does not exist.
    async fn lookup(&self, product_id: &str) -> Result<Option<CatalogProduct>, CatalogError>;
}

/// HashMap-backed catalog for tests and the seed binary.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<String, CatalogProduct>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        InMemoryCatalog::default()
    }

    /// Builder-style insert.
    pub fn with_product(mut self, product: CatalogProduct) -> Self {
        self.products.get_mut().insert(product.id.clone(), product);
        self
    }

    /// Inserts a product whose price arrives as text (`"29.99"`, `"$29.99"`).
    pub async fn insert_priced(
        &self,
        id: &str,
        title: &str,
        price: &str,
    ) -> Result<(), CatalogError> {
        let price = Money::from_str(price).map_err(|_| CatalogError::InvalidPrice {
            product_id: id.to_string(),
            raw: price.to_string(),
        })?;
        self.insert(CatalogProduct::new(id, title, price)).await;
        Ok(())
    }

    pub async fn insert(&self, product: CatalogProduct) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    pub async fn remove(&self, product_id: &str) -> Option<CatalogProduct> {
        self.products.write().await.remove(product_id)
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn lookup(&self, product_id: &str) -> Result<Option<CatalogProduct>, CatalogError> {
        Ok(self.products.read().await.get(product_id).cloned())
    }
}
