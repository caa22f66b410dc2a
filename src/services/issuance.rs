use crate::{
    commands::{
        stock::{IssueStockCommand, ReturnIssuanceCommand},
        Command,
    },
    db::DbPool,
    entities::issuance::{self, Entity as Issuances},
    errors::ServiceError,
    events::EventSender,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service for issuing stock against orders and processing returns.
///
/// The acting user is always caller-provided; nothing here reads ambient
/// session state.
#[derive(Clone)]
pub struct IssuanceService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl IssuanceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Issues `quantity` of a stock item, recording the deduction against an
    /// order. Fails with `InsufficientStock` (carrying available/requested)
    /// when the item cannot cover the request; nothing is mutated in that
    /// case.
    #[instrument(skip(self, remarks))]
    pub async fn issue(
        &self,
        order_id: Option<Uuid>,
        stock_item_id: Uuid,
        quantity: i32,
        issued_by: Uuid,
        remarks: Option<String>,
    ) -> Result<issuance::Model, ServiceError> {
        IssueStockCommand {
            stock_item_id,
            order_id,
            quantity,
            issued_by,
            remarks,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    /// Reverses an issuance exactly once, restoring the issued quantity.
    /// A second return fails with `AlreadyProcessed` and credits nothing.
    #[instrument(skip(self, remarks))]
    pub async fn return_issuance(
        &self,
        issuance_id: Uuid,
        returned_by: Option<Uuid>,
        remarks: Option<String>,
    ) -> Result<issuance::Model, ServiceError> {
        ReturnIssuanceCommand {
            issuance_id,
            returned_by,
            remarks,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_issuance(&self, id: Uuid) -> Result<issuance::Model, ServiceError> {
        Issuances::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Issuance {} not found", id)))
    }

    /// All issuances recorded against one order, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<issuance::Model>, ServiceError> {
        Issuances::find()
            .filter(issuance::Column::OrderId.eq(order_id))
            .order_by_desc(issuance::Column::IssuedAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
