use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_stock_items_table::StockItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issuances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issuances::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Issuances::StockItemId).uuid().not_null())
                    .col(ColumnDef::new(Issuances::OrderId).uuid().null())
                    .col(ColumnDef::new(Issuances::Quantity).integer().not_null())
                    .col(ColumnDef::new(Issuances::IssuedBy).uuid().not_null())
                    .col(ColumnDef::new(Issuances::Status).string().not_null())
                    .col(ColumnDef::new(Issuances::IssuedAt).timestamp().not_null())
                    .col(ColumnDef::new(Issuances::ReturnedAt).timestamp().null())
                    .col(ColumnDef::new(Issuances::Remarks).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issuances_stock_item_id")
                            .from(Issuances::Table, Issuances::StockItemId)
                            .to(StockItems::Table, StockItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issuances_order_id")
                    .table(Issuances::Table)
                    .col(Issuances::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issuances_stock_item_id")
                    .table(Issuances::Table)
                    .col(Issuances::StockItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issuances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Issuances {
    Table,
    Id,
    StockItemId,
    OrderId,
    Quantity,
    IssuedBy,
    Status,
    IssuedAt,
    ReturnedAt,
    Remarks,
}
