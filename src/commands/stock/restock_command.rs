use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        stock_item::{self, Entity as StockItems},
        stock_ledger_entry::{self, LedgerEntryType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Adds quantity to a stock item and appends a `restocked` ledger entry.
/// There is no upper bound: `original_quantity` is a reporting baseline, not
/// a capacity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestockCommand {
    pub stock_item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub changed_by: Uuid,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[async_trait::async_trait]
impl Command for RestockCommand {
    type Result = stock_item::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            ServiceError::ValidationError(format!("Invalid restock request: {}", e))
        })?;

        let updated = self.restock_in_db(&db_pool).await?;

        info!(
            stock_item_id = %updated.id,
            quantity = %self.quantity,
            new_quantity = %updated.current_quantity,
            "stock restocked"
        );
        event_sender
            .send(Event::StockRestocked {
                stock_item_id: updated.id,
                quantity: self.quantity,
                new_quantity: updated.current_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }
}

impl RestockCommand {
    async fn restock_in_db(&self, db: &DbPool) -> Result<stock_item::Model, ServiceError> {
        let stock_item_id = self.stock_item_id;
        let quantity = self.quantity;
        let changed_by = self.changed_by;
        let reason = self.reason.clone();

        db.transaction::<_, stock_item::Model, ServiceError>(move |txn| {
            Box::pin(async move {
                let item = StockItems::find_by_id(stock_item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Stock item {} not found", stock_item_id))
                    })?;

                let now = Utc::now();

                StockItems::update_many()
                    .col_expr(
                        stock_item::Column::CurrentQuantity,
                        Expr::col(stock_item::Column::CurrentQuantity).add(quantity),
                    )
                    .col_expr(stock_item::Column::UpdatedAt, Expr::value(now))
                    .filter(stock_item::Column::Id.eq(stock_item_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                stock_ledger_entry::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    stock_item_id: Set(stock_item_id),
                    entry_type: Set(LedgerEntryType::Restocked.as_str().to_string()),
                    quantity: Set(quantity),
                    previous_quantity: Set(item.current_quantity),
                    changed_by: Set(changed_by),
                    reason: Set(reason),
                    reference_id: Set(None),
                    reference_type: Set(None),
                    occurred_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

                StockItems::find_by_id(stock_item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Stock item {} not found", stock_item_id))
                    })
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
