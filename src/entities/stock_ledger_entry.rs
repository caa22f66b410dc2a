use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kinds of quantity change a ledger entry can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    Issued,
    Restocked,
    Returned,
    Adjusted,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Issued => "issued",
            LedgerEntryType::Restocked => "restocked",
            LedgerEntryType::Returned => "returned",
            LedgerEntryType::Adjusted => "adjusted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "issued" => Some(LedgerEntryType::Issued),
            "restocked" => Some(LedgerEntryType::Restocked),
            "returned" => Some(LedgerEntryType::Returned),
            "adjusted" => Some(LedgerEntryType::Adjusted),
            _ => None,
        }
    }
}

/// One immutable audit record of a quantity change. Entries are owned by
/// their stock item and never outlive it (the schema uses RESTRICT, and
/// deletion of items with history is refused at the service layer).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = LedgerEntry)]
#[sea_orm(table_name = "stock_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stock_item_id: Uuid,
    /// Stored as string in the DB; convert through `LedgerEntryType`.
    pub entry_type: String,
    /// Magnitude of the change, always positive.
    pub quantity: i32,
    /// Snapshot of the item quantity immediately before the change.
    pub previous_quantity: i32,
    pub changed_by: Uuid,
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_item::Entity",
        from = "Column::StockItemId",
        to = "super::stock_item::Column::Id"
    )]
    StockItem,
}

impl Related<super::stock_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
