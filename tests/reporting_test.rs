mod common;

use chrono::{DateTime, TimeZone, Utc};
use clinic_stock_api::{
    entities::stock_item,
    services::reporting::{SortMode, StockSearch},
};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

async fn insert_item_at(
    app: &common::TestApp,
    name: &str,
    category: &str,
    quantity: i32,
    created_at: DateTime<Utc>,
) -> stock_item::Model {
    stock_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_name: Set(name.to_string()),
        category: Set(category.to_string()),
        current_quantity: Set(quantity),
        original_quantity: Set(quantity),
        unit_price: Set(dec!(1.00)),
        batch_number: Set(format!("B-{}", name)),
        width_cm: Set(None),
        height_cm: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(app.db.as_ref())
    .await
    .unwrap()
}

#[tokio::test]
async fn low_stock_uses_a_strict_twenty_percent_boundary() {
    let app = common::setup().await;

    // 100/500 is exactly 20% and must NOT show up; 99/500 must.
    let boundary = app
        .stock
        .create_stock_item(common::new_item("Boundary batch", "single_vision", 500))
        .await
        .unwrap();
    app.stock
        .adjust(boundary.id, 100, Uuid::new_v4(), None)
        .await
        .unwrap();

    let low = app
        .stock
        .create_stock_item(common::new_item("Low batch", "single_vision", 500))
        .await
        .unwrap();
    app.stock
        .adjust(low.id, 99, Uuid::new_v4(), None)
        .await
        .unwrap();

    // Zero original quantity is "not applicable", never low stock.
    app.stock
        .create_stock_item(common::new_item("Empty batch", "misc", 0))
        .await
        .unwrap();

    let report = app.reporting.low_stock().await.unwrap();
    let ids: Vec<Uuid> = report.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![low.id]);
}

#[tokio::test]
async fn default_search_order_is_fifo_with_quantity_tiebreak() {
    let app = common::setup().await;
    let jan = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
    let jun = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

    let oldest = insert_item_at(&app, "Oldest", "single_vision", 5, jan).await;
    let newer_small = insert_item_at(&app, "Newer small", "single_vision", 50, jun).await;
    let newer_large = insert_item_at(&app, "Newer large", "single_vision", 80, jun).await;

    let (items, total) = app
        .reporting
        .search(StockSearch::default())
        .await
        .unwrap();
    assert_eq!(total, 3);
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    // Oldest first; the June tie resolves by higher remaining quantity.
    assert_eq!(ids, vec![oldest.id, newer_large.id, newer_small.id]);
}

#[tokio::test]
async fn search_matches_product_name_and_batch_number() {
    let app = common::setup().await;
    let jan = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let named = insert_item_at(&app, "Photochromic grey", "photochromic", 10, jan).await;
    insert_item_at(&app, "Clear 1.50", "single_vision", 10, jan).await;

    let (by_name, _) = app
        .reporting
        .search(StockSearch {
            term: Some("Photochromic".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, named.id);

    // Batch numbers are searchable through the same term.
    let (by_batch, _) = app
        .reporting
        .search(StockSearch {
            term: Some("B-Clear".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_batch.len(), 1);
    assert_eq!(by_batch[0].product_name, "Clear 1.50");
}

#[tokio::test]
async fn search_filters_by_category_and_sorts_by_quantity() {
    let app = common::setup().await;
    let jan = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    insert_item_at(&app, "A", "bifocal", 10, jan).await;
    insert_item_at(&app, "B", "bifocal", 40, jan).await;
    insert_item_at(&app, "C", "single_vision", 99, jan).await;

    let (items, total) = app
        .reporting
        .search(StockSearch {
            category: Some("bifocal".into()),
            sort: SortMode::Quantity,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 2);
    let quantities: Vec<i32> = items.iter().map(|i| i.current_quantity).collect();
    assert_eq!(quantities, vec![40, 10]);
}

#[tokio::test]
async fn glass_area_sums_per_category_in_square_meters() {
    let app = common::setup().await;

    // 100cm x 50cm = 0.5 m² per sheet, 10 sheets -> 5 m²
    app.stock
        .create_stock_item(common::glass_item(
            "Sheet A",
            "float_glass",
            10,
            dec!(100),
            dec!(50),
        ))
        .await
        .unwrap();
    // 200cm x 100cm = 2 m² per sheet, 1 sheet -> 2 m²
    app.stock
        .create_stock_item(common::glass_item(
            "Sheet B",
            "float_glass",
            1,
            dec!(200),
            dec!(100),
        ))
        .await
        .unwrap();
    // Dimensionless medicine stock must not contribute.
    app.stock
        .create_stock_item(common::new_item("Paracetamol", "analgesic", 500))
        .await
        .unwrap();

    let rows = app.reporting.glass_area_by_category().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "float_glass");
    assert_eq!(rows[0].total_area_m2, dec!(7));
    assert_eq!(rows[0].total_sheets, 11);
}

#[tokio::test]
async fn stock_value_aggregates_per_category_and_in_total() {
    let app = common::setup().await;

    let mut cheap = common::new_item("Cheap", "consumable", 8);
    cheap.unit_price = dec!(1.25);
    let mut pricey = common::new_item("Pricey", "frame", 4);
    pricey.unit_price = dec!(2.50);
    app.stock.create_stock_item(cheap).await.unwrap();
    app.stock.create_stock_item(pricey).await.unwrap();

    let report = app.reporting.stock_value_by_category().await.unwrap();
    assert_eq!(report.total_value, dec!(20.00));
    assert_eq!(report.categories.len(), 2);
    let consumable = report
        .categories
        .iter()
        .find(|c| c.category == "consumable")
        .unwrap();
    assert_eq!(consumable.total_value, dec!(10.00));
}

#[tokio::test]
async fn pagination_caps_the_page_size() {
    let app = common::setup().await;
    let jan = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for n in 0..5 {
        insert_item_at(&app, &format!("Item {}", n), "misc", 10 + n, jan).await;
    }

    let (page1, total) = app
        .reporting
        .search(StockSearch {
            limit: 2,
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page1.len(), 2);

    let (page3, _) = app
        .reporting
        .search(StockSearch {
            limit: 2,
            page: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page3.len(), 1);
}
