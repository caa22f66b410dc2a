use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A quantity-tracked inventory unit: one glass sheet batch or one medicine
/// batch. `original_quantity` is fixed at creation and serves as the baseline
/// for percentage-remaining reporting; it is not an upper bound on restocks.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = StockItem)]
#[sea_orm(table_name = "stock_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_name: String,
    pub category: String,
    pub current_quantity: i32,
    pub original_quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_price: Decimal,
    pub batch_number: String,
    /// Sheet dimensions, set for glass stock only. Medicine batches leave
    /// these null and are skipped by the area aggregation.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub width_cm: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub height_cm: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_ledger_entry::Entity")]
    StockLedgerEntry,
    #[sea_orm(has_many = "super::issuance::Entity")]
    Issuance,
}

impl Related<super::stock_ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLedgerEntry.def()
    }
}

impl Related<super::issuance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issuance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
