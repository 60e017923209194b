//! Admin save through storefront quote against an in-memory database.

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tierline_core::{DiscountType, Field, ModelDraft, ModelUpdate, Money, Tier};
use tierline_db::{
    AdminService, CatalogProduct, Database, DbConfig, InMemoryCatalog, ModelFilter,
    StatusFilter, StorefrontService,
};

fn tier(min: i64, max: Option<i64>, kind: DiscountType, value: Decimal) -> Tier {
    Tier::new(min, max, kind, value)
}

async fn services() -> (AdminService, StorefrontService<InMemoryCatalog>) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let catalog = InMemoryCatalog::new()
        .with_product(CatalogProduct::new("coffee", "House Blend", Money::from_cents(2999)))
        .with_product(CatalogProduct::new("mug", "Stoneware Mug", Money::from_cents(1250)));

    (
        AdminService::new(db.clone(), "shop-a"),
        StorefrontService::new(db, "shop-a", catalog),
    )
}

#[tokio::test]
async fn test_save_then_quote() {
    let (admin, storefront) = services().await;

    let model = admin
        .create_model(ModelDraft {
            name: "Bulk Coffee".to_string(),
            product_ids: BTreeSet::from(["coffee".to_string()]),
            tiers: vec![
                tier(5, Some(9), DiscountType::Percent, Decimal::new(10, 0)),
                tier(10, None, DiscountType::Percent, Decimal::new(15, 0)),
            ],
            active: true,
            ..ModelDraft::default()
        })
        .await
        .unwrap();

    let expected = [
        (1, "$29.99", "$29.99"),
        (4, "$29.99", "$119.96"),
        (5, "$26.99", "$134.96"),
        (9, "$26.99", "$242.92"),
        (10, "$25.49", "$254.92"),
        (100, "$25.49", "$2549.15"),
    ];
    for (quantity, unit, total) in expected {
        let quote = storefront.quote("coffee", quantity).await.unwrap();
        assert_eq!(quote.unit_price.to_string(), unit, "unit price at {}", quantity);
        assert_eq!(quote.line_total.to_string(), total, "line total at {}", quantity);
    }

    // Switching to FIXED_PRICE replaces the whole ladder
    admin
        .update_model(
            &model.id,
            ModelUpdate {
                tiers: Some(vec![tier(3, None, DiscountType::FixedPrice, Decimal::new(35, 0))]),
                ..ModelUpdate::default()
            },
        )
        .await
        .unwrap();

    let quote = storefront.quote("coffee", 3).await.unwrap();
    assert_eq!(quote.unit_price, Money::from_cents(3500));
    assert!(quote.savings_per_unit.is_zero());

    let payload = storefront.display("coffee").await.unwrap();
    assert_eq!(payload.summary, "3+ → $35/unit");
}

#[tokio::test]
async fn test_amount_discount_never_goes_negative() {
    let (admin, storefront) = services().await;

    admin
        .create_model(ModelDraft {
            name: "Mug Clearance".to_string(),
            product_ids: BTreeSet::from(["mug".to_string()]),
            tiers: vec![tier(2, None, DiscountType::Amount, Decimal::new(20, 0))],
            active: true,
            ..ModelDraft::default()
        })
        .await
        .unwrap();

    let quote = storefront.quote("mug", 2).await.unwrap();
    assert!(quote.unit_price.is_zero());
    assert_eq!(quote.savings_per_unit, Money::from_cents(1250));
    assert_eq!(quote.savings_percent, Decimal::new(100, 0));
}

#[tokio::test]
async fn test_rejected_save_leaves_storefront_untouched() {
    let (admin, storefront) = services().await;

    let err = admin
        .create_model(ModelDraft {
            name: "Overlapping".to_string(),
            product_ids: BTreeSet::from(["coffee".to_string()]),
            tiers: vec![
                tier(5, Some(10), DiscountType::Percent, Decimal::new(10, 0)),
                tier(8, Some(20), DiscountType::Percent, Decimal::new(15, 0)),
            ],
            active: true,
            ..ModelDraft::default()
        })
        .await
        .unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, Field::MinQty);
    assert_eq!(errors[0].tier_index, Some(1));

    let quote = storefront.quote("coffee", 8).await.unwrap();
    assert_eq!(quote.unit_price, Money::from_cents(2999));
    assert!(!storefront.display("coffee").await.unwrap().active);
}

#[tokio::test]
async fn test_deactivate_and_reactivate() {
    let (admin, storefront) = services().await;

    let model = admin
        .create_model(ModelDraft {
            name: "Bulk Coffee".to_string(),
            product_ids: BTreeSet::from(["coffee".to_string()]),
            tiers: vec![tier(2, None, DiscountType::Percent, Decimal::new(50, 0))],
            active: true,
            ..ModelDraft::default()
        })
        .await
        .unwrap();

    assert!(storefront.display("coffee").await.unwrap().active);

    admin.toggle_active(&model.id).await.unwrap();
    assert!(!storefront.display("coffee").await.unwrap().active);
    assert_eq!(
        storefront.quote("coffee", 2).await.unwrap().unit_price,
        Money::from_cents(2999)
    );

    admin.toggle_active(&model.id).await.unwrap();
    let quote = storefront.quote("coffee", 2).await.unwrap();
    assert_eq!(quote.unit_price.to_string(), "$15.00");

    let active = admin
        .list_models(&ModelFilter::default().status(StatusFilter::Active))
        .await
        .unwrap();
    assert_eq!(active.total, 1);
}

#[tokio::test]
async fn test_shops_are_isolated() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let catalog = InMemoryCatalog::new()
        .with_product(CatalogProduct::new("coffee", "House Blend", Money::from_cents(2999)));

    AdminService::new(db.clone(), "shop-a")
        .create_model(ModelDraft {
            name: "Bulk Coffee".to_string(),
            product_ids: BTreeSet::from(["coffee".to_string()]),
            tiers: vec![tier(1, None, DiscountType::Percent, Decimal::new(10, 0))],
            active: true,
            ..ModelDraft::default()
        })
        .await
        .unwrap();

    let other_shop = StorefrontService::new(db.clone(), "shop-b", catalog);
    let quote = other_shop.quote("coffee", 5).await.unwrap();
    assert_eq!(quote.unit_price, Money::from_cents(2999));

    let listed = AdminService::new(db, "shop-b")
        .list_models(&ModelFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
}
