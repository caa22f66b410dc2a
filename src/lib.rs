//! Clinic Stock API Library
//!
//! Inventory and issuance backend for clinic and optical retail stock:
//! glass and medicine batches, order issuance, returns, and an append-only
//! audit ledger.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;

use axum::{response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use services::{issuance::IssuanceService, reporting::ReportingService, stock::StockService};

/// Shared service handles, constructed once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub stock: Arc<StockService>,
    pub issuance: Arc<IssuanceService>,
    pub reporting: Arc<ReportingService>,
}

/// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let services = AppServices {
            stock: Arc::new(StockService::new(db.clone(), event_sender.clone())),
            issuance: Arc::new(IssuanceService::new(db.clone(), event_sender.clone())),
            reporting: Arc::new(ReportingService::new(db.clone())),
        };

        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Assembles the full application router.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/stock", handlers::stock::stock_router())
        .nest("/orders", handlers::orders::orders_router())
        .nest("/issuances", handlers::orders::issuances_router());

    Router::new()
        .nest("/api/v1", api)
        .nest("/health", handlers::health::health_router())
        .route("/api-docs/openapi.json", get(openapi_spec))
        .with_state(state)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(<openapi::ApiDoc as utoipa::OpenApi>::openapi())
}
