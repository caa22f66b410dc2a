use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Postgres stores the price as decimal(19, 4). SQLite uses NUMERIC
        // affinity and ignores precision/scale, and sea-query's SQLite backend
        // rejects a precision above 16, so emit a plain decimal there.
        let mut unit_price = ColumnDef::new(StockItems::UnitPrice);
        match manager.get_database_backend() {
            DatabaseBackend::Sqlite => unit_price.decimal(),
            _ => unit_price.decimal_len(19, 4),
        };
        unit_price.not_null();

        manager
            .create_table(
                Table::create()
                    .table(StockItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::ProductName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockItems::Category).string().not_null())
                    .col(
                        ColumnDef::new(StockItems::CurrentQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::OriginalQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(&mut unit_price)
                    .col(
                        ColumnDef::new(StockItems::BatchNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::WidthCm)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::HeightCm)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // FIFO listing and dashboard filters hit these constantly
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stock_items_created_at")
                    .table(StockItems::Table)
                    .col(StockItems::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stock_items_category")
                    .table(StockItems::Table)
                    .col(StockItems::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stock_items_batch_number")
                    .table(StockItems::Table)
                    .col(StockItems::BatchNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum StockItems {
    Table,
    Id,
    ProductName,
    Category,
    CurrentQuantity,
    OriginalQuantity,
    UnitPrice,
    BatchNumber,
    WidthCm,
    HeightCm,
    CreatedAt,
    UpdatedAt,
}
