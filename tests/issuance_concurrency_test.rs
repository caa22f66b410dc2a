use clinic_stock_api::{
    db,
    events::{process_events, EventSender},
    services::{issuance::IssuanceService, stock::StockService},
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

// This test is ignored by default because it needs a real multi-connection DB
// (a pooled sqlite::memory: cannot exercise racing writers).
// Run with: TEST_DATABASE_URL=postgres://... cargo test -- --ignored issuance_concurrency
#[tokio::test]
#[ignore]
async fn issuance_concurrency() {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/clinic_stock_test".to_string());
    let pool = db::establish_connection(&url).await.expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");
    let db_arc = Arc::new(pool);

    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(process_events(rx));
    let sender = Arc::new(EventSender::new(tx));

    let stock = StockService::new(db_arc.clone(), sender.clone());
    let issuance = IssuanceService::new(db_arc.clone(), sender.clone());

    let item = stock
        .create_stock_item(clinic_stock_api::services::stock::NewStockItem {
            product_name: format!("Race batch {}", Uuid::new_v4()),
            category: "single_vision".to_string(),
            quantity: 10,
            unit_price: Decimal::ONE,
            batch_number: "RACE-1".to_string(),
            width_cm: None,
            height_cm: None,
        })
        .await
        .expect("seed item");

    // 20 concurrent single-unit issues against 10 units: exactly 10 may win.
    let mut tasks = vec![];
    for _ in 0..20 {
        let issuance = issuance.clone();
        let item_id = item.id;
        tasks.push(tokio::spawn(async move {
            issuance
                .issue(None, item_id, 1, Uuid::new_v4(), None)
                .await
                .is_ok()
        }));
    }

    let mut success = 0;
    for t in tasks {
        if t.await.unwrap_or(false) {
            success += 1;
        }
    }
    assert_eq!(
        success, 10,
        "exactly 10 issues should succeed; got {}",
        success
    );

    let fresh = stock.get_stock_item(item.id).await.expect("re-read");
    assert_eq!(fresh.current_quantity, 0);
}
