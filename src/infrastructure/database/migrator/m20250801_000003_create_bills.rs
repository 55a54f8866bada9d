//! Create bills table

use sea_orm_migration::prelude::*;

use super::m20250801_000002_create_meter_readings::MeterReadings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bills::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bills::MeterReadingId).integer().not_null())
                    .col(
                        ColumnDef::new(Bills::TotalAmount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bills::PaymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Bills::Penalty)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bills::AmountPaid)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bills::Remaining)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bills::Change)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Bills::PaidAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Bills::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bills::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bills::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bills_meter_reading")
                            .from(Bills::Table, Bills::MeterReadingId)
                            .to(MeterReadings::Table, MeterReadings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 1:1 with meter reading
        manager
            .create_index(
                Index::create()
                    .name("idx_bills_meter_reading_id")
                    .table(Bills::Table)
                    .col(Bills::MeterReadingId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bills::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bills {
    Table,
    Id,
    MeterReadingId,
    TotalAmount,
    PaymentStatus,
    Penalty,
    AmountPaid,
    Remaining,
    Change,
    PaidAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
