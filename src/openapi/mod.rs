use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::stock::list_stock,
        crate::handlers::stock::create_stock_item,
        crate::handlers::stock::get_stock_item,
        crate::handlers::stock::delete_stock_item,
        crate::handlers::stock::stock_history,
        crate::handlers::stock::restock_stock_item,
        crate::handlers::stock::adjust_stock_item,
        crate::handlers::stock::low_stock,
        crate::handlers::stock::stock_value,
        crate::handlers::stock::glass_area,
        crate::handlers::orders::issue_stock,
        crate::handlers::orders::return_issuance,
        crate::handlers::orders::list_order_issuances,
        crate::handlers::orders::get_issuance,
    ),
    components(schemas(
        crate::entities::stock_item::Model,
        crate::entities::stock_ledger_entry::Model,
        crate::entities::stock_ledger_entry::LedgerEntryType,
        crate::entities::issuance::Model,
        crate::entities::issuance::IssuanceStatus,
        crate::errors::ErrorResponse,
        crate::services::stock::NewStockItem,
        crate::services::reporting::SortMode,
        crate::services::reporting::GlassAreaRow,
        crate::services::reporting::CategoryValue,
        crate::services::reporting::StockValueReport,
        crate::handlers::stock::StockListResponse,
        crate::handlers::stock::RestockRequest,
        crate::handlers::stock::AdjustRequest,
        crate::handlers::orders::IssueStockRequest,
        crate::handlers::orders::ReturnIssuanceRequest,
    )),
    tags(
        (name = "stock", description = "Stock items, audit ledger and dashboard reports"),
        (name = "orders", description = "Issuing stock against orders and processing returns")
    ),
    info(
        title = "Clinic Stock API",
        description = "Inventory and issuance backend for clinic and optical retail stock"
    )
)]
pub struct ApiDoc;
