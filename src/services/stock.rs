use crate::{
    commands::{
        stock::{AdjustStockCommand, RestockCommand},
        Command,
    },
    db::DbPool,
    entities::{
        issuance::Entity as Issuances,
        stock_item::{self, Entity as StockItems},
        stock_ledger_entry::{self, Entity as StockLedgerEntries},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Input for registering a new stock item. `original_quantity` is fixed to
/// the opening quantity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewStockItem {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub unit_price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub batch_number: String,
    pub width_cm: Option<Decimal>,
    pub height_cm: Option<Decimal>,
}

/// Service for managing stock items and their audit ledger.
#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, new_item), fields(product_name = %new_item.product_name))]
    pub async fn create_stock_item(
        &self,
        new_item: NewStockItem,
    ) -> Result<stock_item::Model, ServiceError> {
        new_item
            .validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid stock item: {}", e)))?;
        if new_item.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_price cannot be negative".to_string(),
            ));
        }
        for dim in [new_item.width_cm, new_item.height_cm].into_iter().flatten() {
            if dim <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "sheet dimensions must be positive".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let item = stock_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_name: Set(new_item.product_name),
            category: Set(new_item.category),
            current_quantity: Set(new_item.quantity),
            original_quantity: Set(new_item.quantity),
            unit_price: Set(new_item.unit_price),
            batch_number: Set(new_item.batch_number),
            width_cm: Set(new_item.width_cm),
            height_cm: Set(new_item.height_cm),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(stock_item_id = %item.id, "stock item created");
        self.event_sender
            .send(Event::StockItemCreated(item.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get_stock_item(&self, id: Uuid) -> Result<stock_item::Model, ServiceError> {
        StockItems::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Stock item {} not found", id)))
    }

    /// Full audit trail for one item, oldest first.
    #[instrument(skip(self))]
    pub async fn history_for(
        &self,
        stock_item_id: Uuid,
    ) -> Result<Vec<stock_ledger_entry::Model>, ServiceError> {
        // Surface a 404 rather than an empty history for unknown items.
        self.get_stock_item(stock_item_id).await?;

        StockLedgerEntries::find()
            .filter(stock_ledger_entry::Column::StockItemId.eq(stock_item_id))
            .order_by_asc(stock_ledger_entry::Column::OccurredAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Deletes a stock item. Refused while ledger history or issuances still
    /// reference it, so audit trails cannot be orphaned.
    #[instrument(skip(self))]
    pub async fn delete_stock_item(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let history_count = StockLedgerEntries::find()
            .filter(stock_ledger_entry::Column::StockItemId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let issuance_count = Issuances::find()
            .filter(crate::entities::issuance::Column::StockItemId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if history_count > 0 || issuance_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Stock item {} has ledger history and cannot be deleted",
                id
            )));
        }

        let result = StockItems::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Stock item {} not found",
                id
            )));
        }

        info!(stock_item_id = %id, "stock item deleted");
        self.event_sender
            .send(Event::StockItemDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    /// Adds quantity to an item (`restocked` ledger entry).
    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        stock_item_id: Uuid,
        quantity: i32,
        changed_by: Uuid,
        reason: Option<String>,
    ) -> Result<stock_item::Model, ServiceError> {
        RestockCommand {
            stock_item_id,
            quantity,
            changed_by,
            reason,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    /// Sets an item to an absolute counted quantity (reconciliation).
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        stock_item_id: Uuid,
        new_quantity: i32,
        changed_by: Uuid,
        reason: Option<String>,
    ) -> Result<stock_item::Model, ServiceError> {
        AdjustStockCommand {
            stock_item_id,
            new_quantity,
            changed_by,
            reason,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }
}
