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
                    .table(StockLedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockLedgerEntries::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::StockItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::EntryType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::PreviousQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::ChangedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockLedgerEntries::Reason).string().null())
                    .col(
                        ColumnDef::new(StockLedgerEntries::ReferenceId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::ReferenceType)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockLedgerEntries::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_ledger_entries_stock_item_id")
                            .from(
                                StockLedgerEntries::Table,
                                StockLedgerEntries::StockItemId,
                            )
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
                    .name("idx_stock_ledger_entries_item_occurred")
                    .table(StockLedgerEntries::Table)
                    .col(StockLedgerEntries::StockItemId)
                    .col(StockLedgerEntries::OccurredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockLedgerEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum StockLedgerEntries {
    Table,
    Id,
    StockItemId,
    EntryType,
    Quantity,
    PreviousQuantity,
    ChangedBy,
    Reason,
    ReferenceId,
    ReferenceType,
    OccurredAt,
}
