use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IssuanceStatus {
    Issued,
    Returned,
}

impl IssuanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceStatus::Issued => "issued",
            IssuanceStatus::Returned => "returned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "issued" => Some(IssuanceStatus::Issued),
            "returned" => Some(IssuanceStatus::Returned),
            _ => None,
        }
    }
}

/// Links a quantity deduction to an order/recipient. Reversible exactly once
/// via the compensating return; immutable after that.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Issuance)]
#[sea_orm(table_name = "issuances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: i32,
    pub issued_by: Uuid,
    /// Stored as string in the DB; convert through `IssuanceStatus`.
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
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
