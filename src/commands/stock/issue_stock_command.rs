use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        issuance::{self, IssuanceStatus},
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

/// Issues a quantity of a stock item against an order: decrements the item,
/// appends an `issued` ledger entry and creates the Issuance record, all in
/// one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueStockCommand {
    pub stock_item_id: Uuid,
    pub order_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub issued_by: Uuid,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[async_trait::async_trait]
impl Command for IssueStockCommand {
    type Result = issuance::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid issue request: {}", e)))?;

        let (issued, new_quantity) = self.issue_in_db(&db_pool).await?;

        info!(
            issuance_id = %issued.id,
            stock_item_id = %issued.stock_item_id,
            quantity = %issued.quantity,
            new_quantity = %new_quantity,
            "stock issued to order"
        );
        event_sender
            .send(Event::StockIssued {
                issuance_id: issued.id,
                stock_item_id: issued.stock_item_id,
                order_id: issued.order_id,
                quantity: issued.quantity,
                new_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(issued)
    }
}

impl IssueStockCommand {
    async fn issue_in_db(&self, db: &DbPool) -> Result<(issuance::Model, i32), ServiceError> {
        let stock_item_id = self.stock_item_id;
        let order_id = self.order_id;
        let quantity = self.quantity;
        let issued_by = self.issued_by;
        let remarks = self.remarks.clone();

        db.transaction::<_, (issuance::Model, i32), ServiceError>(move |txn| {
            Box::pin(async move {
                let item = StockItems::find_by_id(stock_item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Stock item {} not found", stock_item_id))
                    })?;

                if item.current_quantity < quantity {
                    return Err(ServiceError::InsufficientStock {
                        available: item.current_quantity,
                        requested: quantity,
                    });
                }

                let now = Utc::now();

                // Guarded decrement: the WHERE clause keeps two racing issues
                // from jointly overdrawing a stale read.
                let update = StockItems::update_many()
                    .col_expr(
                        stock_item::Column::CurrentQuantity,
                        Expr::col(stock_item::Column::CurrentQuantity).sub(quantity),
                    )
                    .col_expr(stock_item::Column::UpdatedAt, Expr::value(now))
                    .filter(stock_item::Column::Id.eq(stock_item_id))
                    .filter(stock_item::Column::CurrentQuantity.gte(quantity))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                if update.rows_affected == 0 {
                    // Lost a race since the read above; re-read for fresh numbers.
                    let fresh = StockItems::find_by_id(stock_item_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Stock item {} not found",
                                stock_item_id
                            ))
                        })?;
                    return Err(ServiceError::InsufficientStock {
                        available: fresh.current_quantity,
                        requested: quantity,
                    });
                }

                let issued = issuance::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    stock_item_id: Set(stock_item_id),
                    order_id: Set(order_id),
                    quantity: Set(quantity),
                    issued_by: Set(issued_by),
                    status: Set(IssuanceStatus::Issued.as_str().to_string()),
                    issued_at: Set(now),
                    returned_at: Set(None),
                    remarks: Set(remarks.clone()),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

                stock_ledger_entry::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    stock_item_id: Set(stock_item_id),
                    entry_type: Set(LedgerEntryType::Issued.as_str().to_string()),
                    quantity: Set(quantity),
                    previous_quantity: Set(item.current_quantity),
                    changed_by: Set(issued_by),
                    reason: Set(remarks),
                    reference_id: Set(Some(issued.id)),
                    reference_type: Set(Some("issuance".to_string())),
                    occurred_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

                let new_quantity = item.current_quantity - quantity;
                Ok((issued, new_quantity))
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
