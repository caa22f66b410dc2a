use crate::{
    entities::{stock_item, stock_ledger_entry},
    errors::ServiceError,
    services::{
        reporting::{GlassAreaRow, SortMode, StockSearch, StockValueReport},
        stock::NewStockItem,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct StockSearchQuery {
    /// Matched against product name and batch number
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockListResponse {
    pub items: Vec<stock_item::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    pub quantity: i32,
    pub changed_by: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustRequest {
    pub new_quantity: i32,
    pub changed_by: Uuid,
    pub reason: Option<String>,
}

/// Create the stock router
pub fn stock_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock).post(create_stock_item))
        .route("/low-stock", get(low_stock))
        .route("/reports/value", get(stock_value))
        .route("/reports/glass-area", get(glass_area))
        .route("/:id", get(get_stock_item).delete(delete_stock_item))
        .route("/:id/history", get(stock_history))
        .route("/:id/restock", post(restock_stock_item))
        .route("/:id/adjust", post(adjust_stock_item))
}

/// Search stock items. Default ordering is FIFO (oldest batch first).
#[utoipa::path(
    get,
    path = "/api/v1/stock",
    params(StockSearchQuery),
    responses(
        (status = 200, description = "Matching stock items", body = StockListResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<StockSearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .reporting
        .search(StockSearch {
            term: query.q,
            category: query.category,
            sort: query.sort,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(StockListResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
    }))
}

/// Register a new stock item (glass sheet batch or medicine batch).
#[utoipa::path(
    post,
    path = "/api/v1/stock",
    request_body = NewStockItem,
    responses(
        (status = 201, description = "Stock item created", body = stock_item::Model),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn create_stock_item(
    State(state): State<AppState>,
    Json(payload): Json<NewStockItem>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.stock.create_stock_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock/{id}",
    responses(
        (status = 200, description = "Stock item", body = stock_item::Model),
        (status = 404, description = "Unknown stock item", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn get_stock_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.stock.get_stock_item(id).await?;
    Ok(Json(item))
}

/// Deleting is refused while ledger history or issuances reference the item.
#[utoipa::path(
    delete,
    path = "/api/v1/stock/{id}",
    responses(
        (status = 204, description = "Stock item deleted"),
        (status = 404, description = "Unknown stock item", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item has ledger history", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn delete_stock_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.stock.delete_stock_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Audit trail for one item, oldest entry first.
#[utoipa::path(
    get,
    path = "/api/v1/stock/{id}/history",
    responses(
        (status = 200, description = "Ledger entries", body = [stock_ledger_entry::Model]),
        (status = 404, description = "Unknown stock item", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn stock_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = state.services.stock.history_for(id).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/v1/stock/{id}/restock",
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Updated stock item", body = stock_item::Model),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown stock item", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn restock_stock_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .stock
        .restock(id, payload.quantity, payload.changed_by, payload.reason)
        .await?;
    Ok(Json(item))
}

/// Reconcile an item to a manually counted quantity.
#[utoipa::path(
    post,
    path = "/api/v1/stock/{id}/adjust",
    request_body = AdjustRequest,
    responses(
        (status = 200, description = "Updated stock item", body = stock_item::Model),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown stock item", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn adjust_stock_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .stock
        .adjust(id, payload.new_quantity, payload.changed_by, payload.reason)
        .await?;
    Ok(Json(item))
}

/// Items below the low-stock threshold (strictly under 20% remaining).
#[utoipa::path(
    get,
    path = "/api/v1/stock/low-stock",
    responses(
        (status = 200, description = "Low stock items", body = [stock_item::Model])
    ),
    tag = "stock"
)]
pub async fn low_stock(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.reporting.low_stock().await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock/reports/value",
    responses(
        (status = 200, description = "Stock value per category", body = StockValueReport)
    ),
    tag = "stock"
)]
pub async fn stock_value(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reporting.stock_value_by_category().await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock/reports/glass-area",
    responses(
        (status = 200, description = "Remaining glass area per category, in m²", body = [GlassAreaRow])
    ),
    tag = "stock"
)]
pub async fn glass_area(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.reporting.glass_area_by_category().await?;
    Ok(Json(rows))
}
