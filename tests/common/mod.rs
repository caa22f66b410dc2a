#![allow(dead_code)]

use clinic_stock_api::{
    db::DbPool,
    events::{process_events, EventSender},
    services::{
        issuance::IssuanceService,
        reporting::ReportingService,
        stock::{NewStockItem, StockService},
    },
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub stock: StockService,
    pub issuance: IssuanceService,
    pub reporting: ReportingService,
}

/// Boots an isolated sqlite::memory: database with migrations applied.
/// A single pooled connection keeps every query on the same in-memory DB.
pub async fn setup() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open sqlite::memory:");
    clinic_stock_api::db::run_migrations(&db)
        .await
        .expect("migrations failed");
    let db = Arc::new(db);

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(process_events(rx));
    let sender = Arc::new(EventSender::new(tx));

    TestApp {
        stock: StockService::new(db.clone(), sender.clone()),
        issuance: IssuanceService::new(db.clone(), sender.clone()),
        reporting: ReportingService::new(db.clone()),
        db,
    }
}

pub fn new_item(name: &str, category: &str, quantity: i32) -> NewStockItem {
    NewStockItem {
        product_name: name.to_string(),
        category: category.to_string(),
        quantity,
        unit_price: dec!(1.00),
        batch_number: format!("B-{}", name),
        width_cm: None,
        height_cm: None,
    }
}

pub fn glass_item(
    name: &str,
    category: &str,
    quantity: i32,
    width_cm: Decimal,
    height_cm: Decimal,
) -> NewStockItem {
    NewStockItem {
        width_cm: Some(width_cm),
        height_cm: Some(height_cm),
        ..new_item(name, category, quantity)
    }
}
