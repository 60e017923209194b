//! # Demo Data Seeder
//!
//! Creates a handful of pricing models for development and prints what the
//! storefront would show for them.
//!
//! ## Usage
//! ```bash
//! # Settings from TIERLINE_* environment variables
//! cargo run -p tierline-db --bin seed
//!
//! # Override database path or shop
//! cargo run -p tierline-db --bin seed -- --db ./data/tierline.db --shop demo-shop
//!
//! # More detail
//! RUST_LOG=tierline_db=debug cargo run -p tierline-db --bin seed
//! ```
//!
//! ## Seeded Models
//! - Bulk Coffee: `5-9 → 10% off; 10+ → 15% off`
//! - Mug Bundle: flat amount off per unit
//! - Tea Sampler: fixed unit price ladder (created inactive)

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use tierline_core::{
    BadgeTone, DiscountType, DisplaySettings, DisplayStyle, ModelDraft, Money, Tier,
};
use tierline_db::{
    AdminService, CatalogProduct, Database, InMemoryCatalog, ModelFilter, StoreConfig,
    StorefrontService,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Demo catalog: (product id, title, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("coffee-house-blend", "House Blend Coffee 1lb", 2999),
    ("coffee-dark-roast", "Dark Roast Coffee 1lb", 3199),
    ("mug-stoneware", "Stoneware Mug", 1250),
    ("tea-sampler", "Loose Leaf Tea Sampler", 1999),
];

/// Quantities quoted after seeding
const QUOTE_QUANTITIES: &[u32] = &[1, 5, 7, 12];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = StoreConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--shop" | "-s" => {
                if i + 1 < args.len() {
                    config.shop_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tierline Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: TIERLINE_DATABASE_PATH)");
                println!("  -s, --shop <ID>    Shop to seed (default: TIERLINE_SHOP_ID)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(
        database = %config.database_path.display(),
        shop_id = %config.shop_id,
        "Seeding pricing models"
    );

    let db = Database::new(config.db_config()).await?;
    let admin = AdminService::new(db.clone(), config.shop_id.as_str());

    let existing = db.models(&config.shop_id).count().await?;
    if existing > 0 {
        warn!(existing, "Shop already has pricing models; skipping seed");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    for draft in demo_models() {
        match admin.create_model(draft).await {
            Ok(model) => info!(model_id = %model.id, name = %model.name, "Created model"),
            Err(e) => warn!(error = %e, "Failed to create model"),
        }
    }

    println!();
    println!("Pricing models");
    println!("==============");
    let page = admin.list_models(&ModelFilter::default().page(1, config.page_size)).await?;
    for listing in &page.items {
        let status = if listing.model.active { "active" } else { "inactive" };
        println!(
            "  {:<14} [{}] {} product(s): {}",
            listing.model.name, status, listing.product_count, listing.summary
        );
    }

    let catalog = PRODUCTS
        .iter()
        .fold(InMemoryCatalog::new(), |catalog, (id, title, cents)| {
            catalog.with_product(CatalogProduct::new(*id, *title, Money::from_cents(*cents)))
        });
    let storefront = StorefrontService::from_config(db.clone(), &config, catalog);

    println!();
    println!("Storefront quotes");
    println!("=================");
    for (product_id, title, _) in PRODUCTS {
        println!("  {}", title);
        for &quantity in QUOTE_QUANTITIES {
            let quote = storefront.quote(product_id, quantity).await?;
            println!(
                "    x{:<3} {} each, {} total (saves {})",
                quantity, quote.unit_price, quote.line_total, quote.savings_total
            );
        }
    }

    db.close().await;
    info!("Seed complete");
    Ok(())
}

fn products(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn demo_models() -> Vec<ModelDraft> {
    vec![
        ModelDraft {
            name: "Bulk Coffee".to_string(),
            product_ids: products(&["coffee-house-blend", "coffee-dark-roast"]),
            tiers: vec![
                Tier::new(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)),
                Tier::new(10, None, DiscountType::Percent, Decimal::new(15, 0)),
            ],
            display: DisplaySettings::default(),
            active: true,
        },
        ModelDraft {
            name: "Mug Bundle".to_string(),
            product_ids: products(&["mug-stoneware"]),
            tiers: vec![
                Tier::new(2, Some(5), DiscountType::Amount, Decimal::new(150, 2)),
                Tier::new(6, None, DiscountType::Amount, Decimal::new(300, 2)),
            ],
            display: DisplaySettings {
                style: DisplayStyle::TierTable,
                badge_tone: BadgeTone::Attention,
                ..DisplaySettings::default()
            },
            active: true,
        },
        ModelDraft {
            name: "Tea Sampler".to_string(),
            product_ids: products(&["tea-sampler"]),
            tiers: vec![
                Tier::new(3, Some(5), DiscountType::FixedPrice, Decimal::new(1799, 2)),
                Tier::new(6, None, DiscountType::FixedPrice, Decimal::new(1599, 2)),
            ],
            display: DisplaySettings::default(),
            active: false,
        },
    ]
}
