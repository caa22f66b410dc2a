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

/// Reconciliation primitive for manual stock counts: sets the quantity to an
/// absolute value, recording the difference as a single ledger entry. Not a
/// delta operation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdjustStockCommand {
    pub stock_item_id: Uuid,
    #[validate(range(min = 0))]
    pub new_quantity: i32,
    pub changed_by: Uuid,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Which ledger entry a count correction produces: a shortfall reads as
/// `issued`, a surplus as `restocked`. A count matching the books records
/// nothing.
pub fn adjustment_entry(previous: i32, new: i32) -> Option<(LedgerEntryType, i32)> {
    let diff = new - previous;
    match diff {
        0 => None,
        d if d < 0 => Some((LedgerEntryType::Issued, d.abs())),
        d => Some((LedgerEntryType::Restocked, d)),
    }
}

#[async_trait::async_trait]
impl Command for AdjustStockCommand {
    type Result = stock_item::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid adjustment: {}", e)))?;

        let (updated, previous_quantity) = self.adjust_in_db(&db_pool).await?;
        if previous_quantity == updated.current_quantity {
            return Ok(updated);
        }

        info!(
            stock_item_id = %updated.id,
            previous_quantity = %previous_quantity,
            new_quantity = %updated.current_quantity,
            "stock adjusted"
        );
        event_sender
            .send(Event::StockAdjusted {
                stock_item_id: updated.id,
                previous_quantity,
                new_quantity: updated.current_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }
}

impl AdjustStockCommand {
    async fn adjust_in_db(&self, db: &DbPool) -> Result<(stock_item::Model, i32), ServiceError> {
        let stock_item_id = self.stock_item_id;
        let new_quantity = self.new_quantity;
        let changed_by = self.changed_by;
        let reason = self.reason.clone();

        db.transaction::<_, (stock_item::Model, i32), ServiceError>(move |txn| {
            Box::pin(async move {
                let item = StockItems::find_by_id(stock_item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Stock item {} not found", stock_item_id))
                    })?;

                let previous_quantity = item.current_quantity;
                let Some((entry_type, magnitude)) = adjustment_entry(previous_quantity, new_quantity)
                else {
                    // Count matches the books; nothing to record.
                    return Ok((item, previous_quantity));
                };

                let now = Utc::now();

                StockItems::update_many()
                    .col_expr(stock_item::Column::CurrentQuantity, Expr::value(new_quantity))
                    .col_expr(stock_item::Column::UpdatedAt, Expr::value(now))
                    .filter(stock_item::Column::Id.eq(stock_item_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                stock_ledger_entry::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    stock_item_id: Set(stock_item_id),
                    entry_type: Set(entry_type.as_str().to_string()),
                    quantity: Set(magnitude),
                    previous_quantity: Set(previous_quantity),
                    changed_by: Set(changed_by),
                    reason: Set(reason),
                    reference_id: Set(None),
                    reference_type: Set(None),
                    occurred_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

                let updated = StockItems::find_by_id(stock_item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Stock item {} not found", stock_item_id))
                    })?;

                Ok((updated, previous_quantity))
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_records_an_issue_of_the_difference() {
        assert_eq!(
            adjustment_entry(10, 4),
            Some((LedgerEntryType::Issued, 6))
        );
    }

    #[test]
    fn surplus_records_a_restock_of_the_difference() {
        assert_eq!(
            adjustment_entry(4, 10),
            Some((LedgerEntryType::Restocked, 6))
        );
    }

    #[test]
    fn matching_count_records_nothing() {
        assert_eq!(adjustment_entry(7, 7), None);
    }
}
