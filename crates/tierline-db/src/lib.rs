//! # tierline-db: Storage Layer and Services for Tierline
//!
//! Persists pricing models in SQLite (via sqlx) and exposes the two
//! surfaces that consume `tierline-core`: the admin service and the
//! storefront service.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tierline Data Flow                               │
//! │                                                                         │
//! │  Admin save (ModelDraft)               Storefront (product_id, qty)    │
//! │       │                                        │                        │
//! │       ▼                                        ▼                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tierline-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Services    │   │  Repositories  │   │   Database    │   │   │
//! │  │   │               │   │                │   │   (pool.rs)   │   │   │
//! │  │   │ AdminService  │──►│ PricingModel   │──►│ SqlitePool    │   │   │
//! │  │   │ Storefront    │   │ Association    │   │ Migrations    │   │   │
//! │  │   │   Service     │   │ PricingCache   │   │ (embedded)    │   │   │
//! │  │   └──────┬────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │          │                                                      │   │
//! │  │          ▼                                                      │   │
//! │  │   Catalog (trait) ── list prices from outside                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      SQLite Database                            │   │
//! │  │                  TIERLINE_DATABASE_PATH                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven store configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Models, product associations, display cache
//! - [`catalog`] - Product lookup seam
//! - [`service`] - Admin and storefront services
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tierline_db::{AdminService, Database, InMemoryCatalog, StoreConfig, StorefrontService};
//!
//! let config = StoreConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let admin = AdminService::new(db.clone(), config.shop_id.as_str());
//! admin.create_model(draft).await?;
//!
//! let storefront = StorefrontService::from_config(db, &config, InMemoryCatalog::new());
//! let quote = storefront.quote("p1", 7).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{Catalog, CatalogError, CatalogProduct, InMemoryCatalog};
pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::association::AssociationRepository;
pub use repository::cache::PricingCacheRepository;
pub use repository::model::PricingModelRepository;
pub use repository::{ModelFilter, Page, StatusFilter};

pub use service::admin::{AdminService, ModelListing};
pub use service::storefront::{ProductOffers, ProductQuote, StorefrontService};
pub use service::{ServiceError, ServiceResult};
