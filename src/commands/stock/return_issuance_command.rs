use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        issuance::{self, Entity as Issuances, IssuanceStatus},
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

/// Compensates a prior issue: restores the issued quantity to the stock item,
/// appends a `returned` ledger entry and flips the issuance to `returned`.
/// An issuance can be returned exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReturnIssuanceCommand {
    pub issuance_id: Uuid,
    /// Acting user; falls back to the original issuer when absent.
    pub returned_by: Option<Uuid>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[async_trait::async_trait]
impl Command for ReturnIssuanceCommand {
    type Result = issuance::Model;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid return request: {}", e)))?;

        let (returned, new_quantity) = self.return_in_db(&db_pool).await?;

        info!(
            issuance_id = %returned.id,
            stock_item_id = %returned.stock_item_id,
            quantity = %returned.quantity,
            new_quantity = %new_quantity,
            "issuance returned to stock"
        );
        event_sender
            .send(Event::IssuanceReturned {
                issuance_id: returned.id,
                stock_item_id: returned.stock_item_id,
                quantity: returned.quantity,
                new_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(returned)
    }
}

impl ReturnIssuanceCommand {
    async fn return_in_db(&self, db: &DbPool) -> Result<(issuance::Model, i32), ServiceError> {
        let issuance_id = self.issuance_id;
        let returned_by = self.returned_by;
        let remarks = self.remarks.clone();

        db.transaction::<_, (issuance::Model, i32), ServiceError>(move |txn| {
            Box::pin(async move {
                let record = Issuances::find_by_id(issuance_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Issuance {} not found", issuance_id))
                    })?;

                let status = IssuanceStatus::from_str(&record.status).ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Issuance {} has unknown status {:?}",
                        issuance_id, record.status
                    ))
                })?;
                if status == IssuanceStatus::Returned {
                    return Err(ServiceError::AlreadyProcessed(format!(
                        "Issuance {} has already been returned",
                        issuance_id
                    )));
                }

                let item = StockItems::find_by_id(record.stock_item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Stock item {} not found",
                            record.stock_item_id
                        ))
                    })?;

                let now = Utc::now();

                StockItems::update_many()
                    .col_expr(
                        stock_item::Column::CurrentQuantity,
                        Expr::col(stock_item::Column::CurrentQuantity).add(record.quantity),
                    )
                    .col_expr(stock_item::Column::UpdatedAt, Expr::value(now))
                    .filter(stock_item::Column::Id.eq(record.stock_item_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                stock_ledger_entry::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    stock_item_id: Set(record.stock_item_id),
                    entry_type: Set(LedgerEntryType::Returned.as_str().to_string()),
                    quantity: Set(record.quantity),
                    previous_quantity: Set(item.current_quantity),
                    changed_by: Set(returned_by.unwrap_or(record.issued_by)),
                    reason: Set(remarks),
                    reference_id: Set(Some(record.id)),
                    reference_type: Set(Some("issuance".to_string())),
                    occurred_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

                let mut active: issuance::ActiveModel = record.clone().into();
                active.status = Set(IssuanceStatus::Returned.as_str().to_string());
                active.returned_at = Set(Some(now));
                let returned = active
                    .update(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                let new_quantity = item.current_quantity + record.quantity;
                Ok((returned, new_quantity))
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
