//! Create bill_items table

use sea_orm_migration::prelude::*;

use super::m20250801_000003_create_bills::Bills;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BillItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BillItems::BillId).integer().not_null())
                    .col(ColumnDef::new(BillItems::ItemType).string().not_null())
                    .col(
                        ColumnDef::new(BillItems::Usage)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BillItems::Rate)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BillItems::Amount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BillItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BillItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BillItems::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bill_items_bill")
                            .from(BillItems::Table, BillItems::BillId)
                            .to(Bills::Table, Bills::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bill_items_bill_id")
                    .table(BillItems::Table)
                    .col(BillItems::BillId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BillItems {
    Table,
    Id,
    BillId,
    ItemType,
    Usage,
    Rate,
    Amount,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
