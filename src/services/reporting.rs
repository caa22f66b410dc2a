use crate::{
    db::DbPool,
    entities::stock_item::{self, Entity as StockItems},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// Fraction of the original quantity under which an item counts as low stock:
/// strictly below 20%. Exactly 20% is not low stock.
const LOW_STOCK_NUMERATOR: i64 = 1;
const LOW_STOCK_DENOMINATOR: i64 = 5;

/// Low-stock predicate. Integer arithmetic keeps the 20% boundary exact, and
/// a zero original quantity is "not applicable" rather than low stock.
pub fn is_low_stock(current_quantity: i32, original_quantity: i32) -> bool {
    if original_quantity <= 0 {
        return false;
    }
    (current_quantity as i64) * LOW_STOCK_DENOMINATOR
        < (original_quantity as i64) * LOW_STOCK_NUMERATOR
}

/// Area of one glass sheet in m², from cm dimensions.
pub fn sheet_area_m2(width_cm: Decimal, height_cm: Decimal) -> Decimal {
    (width_cm / Decimal::ONE_HUNDRED) * (height_cm / Decimal::ONE_HUNDRED)
}

/// Sort orders for stock search. The default is FIFO: oldest stock first so
/// it gets issued before newer batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Fifo,
    Name,
    Batch,
    Quantity,
}

#[derive(Debug, Clone, Default)]
pub struct StockSearch {
    /// Matched against product name and batch number.
    pub term: Option<String>,
    pub category: Option<String>,
    pub sort: SortMode,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GlassAreaRow {
    pub category: String,
    pub total_area_m2: Decimal,
    pub total_sheets: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryValue {
    pub category: String,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockValueReport {
    pub categories: Vec<CategoryValue>,
    pub total_value: Decimal,
}

/// Read-only queries backing the dashboards. Composes over the stock items
/// table; never mutates.
#[derive(Clone)]
pub struct ReportingService {
    db_pool: Arc<DbPool>,
}

impl ReportingService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Items holding strictly less than 20% of their original quantity.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<stock_item::Model>, ServiceError> {
        let items = StockItems::find()
            .order_by_asc(stock_item::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(items
            .into_iter()
            .filter(|i| is_low_stock(i.current_quantity, i.original_quantity))
            .collect())
    }

    /// Paginated stock search. FIFO default ordering: `created_at` ascending,
    /// ties broken by higher remaining quantity.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        params: StockSearch,
    ) -> Result<(Vec<stock_item::Model>, u64), ServiceError> {
        let mut query = StockItems::find();

        if let Some(term) = params.term.as_deref().filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(stock_item::Column::ProductName.contains(term))
                    .add(stock_item::Column::BatchNumber.contains(term)),
            );
        }
        if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(stock_item::Column::Category.eq(category));
        }

        query = match params.sort {
            SortMode::Fifo => query
                .order_by_asc(stock_item::Column::CreatedAt)
                .order_by_desc(stock_item::Column::CurrentQuantity),
            SortMode::Name => query.order_by_asc(stock_item::Column::ProductName),
            SortMode::Batch => query.order_by_asc(stock_item::Column::BatchNumber),
            SortMode::Quantity => query.order_by_desc(stock_item::Column::CurrentQuantity),
        };

        let limit = if params.limit == 0 { 20 } else { params.limit };
        let page = params.page.max(1);

        let paginator = query.paginate(self.db_pool.as_ref(), limit);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((items, total))
    }

    /// Total remaining glass area per category, in m². Items without sheet
    /// dimensions (medicine batches) are skipped.
    #[instrument(skip(self))]
    pub async fn glass_area_by_category(&self) -> Result<Vec<GlassAreaRow>, ServiceError> {
        let items = StockItems::find()
            .filter(stock_item::Column::WidthCm.is_not_null())
            .filter(stock_item::Column::HeightCm.is_not_null())
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut rows: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for item in items {
            let (Some(width), Some(height)) = (item.width_cm, item.height_cm) else {
                continue;
            };
            let area = sheet_area_m2(width, height) * Decimal::from(item.current_quantity);
            let entry = rows.entry(item.category).or_insert((Decimal::ZERO, 0));
            entry.0 += area;
            entry.1 += item.current_quantity as i64;
        }

        Ok(rows
            .into_iter()
            .map(|(category, (total_area_m2, total_sheets))| GlassAreaRow {
                category,
                total_area_m2,
                total_sheets,
            })
            .collect())
    }

    /// Remaining stock value (unit price × quantity) per category plus the
    /// grand total.
    #[instrument(skip(self))]
    pub async fn stock_value_by_category(&self) -> Result<StockValueReport, ServiceError> {
        let items = StockItems::find()
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut per_category: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut total_value = Decimal::ZERO;
        for item in items {
            let value = item.unit_price * Decimal::from(item.current_quantity);
            *per_category.entry(item.category).or_insert(Decimal::ZERO) += value;
            total_value += value;
        }

        Ok(StockValueReport {
            categories: per_category
                .into_iter()
                .map(|(category, total_value)| CategoryValue {
                    category,
                    total_value,
                })
                .collect(),
            total_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    // 100/500 sits exactly on the 20% boundary and must NOT count as low.
    #[test_case(100, 500, false ; "exactly twenty percent is not low")]
    #[test_case(99, 500, true ; "just under twenty percent is low")]
    #[test_case(101, 500, false ; "just over twenty percent is not low")]
    #[test_case(0, 500, true ; "empty item is low")]
    #[test_case(0, 0, false ; "zero original is never low")]
    #[test_case(10, 0, false ; "zero original with stock is never low")]
    #[test_case(500, 500, false ; "full item is not low")]
    fn low_stock_boundary(current: i32, original: i32, expected: bool) {
        assert_eq!(is_low_stock(current, original), expected);
    }

    #[test]
    fn sheet_area_converts_cm_to_m2() {
        // 100cm x 50cm = 1.0m x 0.5m = 0.5 m²
        assert_eq!(sheet_area_m2(dec!(100), dec!(50)), dec!(0.5));
    }
}
