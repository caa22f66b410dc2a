use crate::{entities::issuance, errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

// The order-issue endpoints keep the camelCase wire contract the dashboards
// already speak; the rest of the API is snake_case.

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueStockRequest {
    pub stock_item_id: Uuid,
    pub quantity: i32,
    pub issued_by: Uuid,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReturnActionQuery {
    pub issuance_id: Uuid,
    pub action: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnIssuanceRequest {
    /// Acting user; defaults to the original issuer when omitted.
    pub returned_by: Option<Uuid>,
    pub remarks: Option<String>,
}

/// Create the orders router (issue / return against an order)
pub fn orders_router() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/issue",
            axum::routing::post(issue_stock).put(return_issuance),
        )
        .route("/:id/issuances", get(list_order_issuances))
}

/// Create the issuances lookup router
pub fn issuances_router() -> Router<AppState> {
    Router::new().route("/:id", get(get_issuance))
}

/// Issue stock against an order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/issue",
    request_body = IssueStockRequest,
    responses(
        (status = 201, description = "Stock issued", body = issuance::Model),
        (status = 404, description = "Unknown order or stock item", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock; details carry available/requested", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn issue_stock(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<IssueStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let issued = state
        .services
        .issuance
        .issue(
            Some(order_id),
            payload.stock_item_id,
            payload.quantity,
            payload.issued_by,
            payload.remarks,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// Return a previously issued quantity back to stock.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/issue",
    params(ReturnActionQuery),
    request_body = ReturnIssuanceRequest,
    responses(
        (status = 200, description = "Issuance returned", body = issuance::Model),
        (status = 404, description = "Unknown issuance", body = crate::errors::ErrorResponse),
        (status = 409, description = "Issuance already returned", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn return_issuance(
    State(state): State<AppState>,
    Path(_order_id): Path<Uuid>,
    Query(query): Query<ReturnActionQuery>,
    Json(payload): Json<ReturnIssuanceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if query.action != "return" {
        return Err(ServiceError::ValidationError(format!(
            "Unsupported action {:?}; only \"return\" is accepted",
            query.action
        )));
    }

    let returned = state
        .services
        .issuance
        .return_issuance(query.issuance_id, payload.returned_by, payload.remarks)
        .await?;
    Ok(Json(returned))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/issuances",
    responses(
        (status = 200, description = "Issuances recorded against the order", body = [issuance::Model])
    ),
    tag = "orders"
)]
pub async fn list_order_issuances(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let issuances = state.services.issuance.list_for_order(order_id).await?;
    Ok(Json(issuances))
}

#[utoipa::path(
    get,
    path = "/api/v1/issuances/{id}",
    responses(
        (status = 200, description = "Issuance", body = issuance::Model),
        (status = 404, description = "Unknown issuance", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_issuance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let issuance = state.services.issuance.get_issuance(id).await?;
    Ok(Json(issuance))
}
