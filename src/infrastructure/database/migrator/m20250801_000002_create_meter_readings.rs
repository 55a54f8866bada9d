//! Create meter_readings table
//!
//! No foreign key to customers: the customer force-delete path removes the
//! customer row without touching descendants, so the constraint is enforced
//! at the service layer instead.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeterReadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeterReadings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MeterReadings::CustomerId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MeterReadings::Period).string().not_null())
                    .col(
                        ColumnDef::new(MeterReadings::MeterStart)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MeterReadings::MeterEnd)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MeterReadings::Usage)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MeterReadings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MeterReadings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MeterReadings::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meter_readings_customer_id")
                    .table(MeterReadings::Table)
                    .col(MeterReadings::CustomerId)
                    .to_owned(),
            )
            .await?;

        // 1 customer, 1 period only
        manager
            .create_index(
                Index::create()
                    .name("idx_meter_readings_customer_period")
                    .table(MeterReadings::Table)
                    .col(MeterReadings::CustomerId)
                    .col(MeterReadings::Period)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeterReadings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MeterReadings {
    Table,
    Id,
    CustomerId,
    Period,
    MeterStart,
    MeterEnd,
    Usage,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
