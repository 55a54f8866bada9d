//! Create audit_logs table (append-only)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuditLogs::Action)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditLogs::EntityType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditLogs::EntityId).integer())
                    .col(
                        ColumnDef::new(AuditLogs::PerformedBy)
                            .string_len(255)
                            .not_null()
                            .default("System"),
                    )
                    .col(ColumnDef::new(AuditLogs::IpAddress).string_len(50))
                    .col(ColumnDef::new(AuditLogs::Details).json())
                    .col(ColumnDef::new(AuditLogs::Description).text())
                    .col(
                        ColumnDef::new(AuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_entity")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::EntityType)
                    .col(AuditLogs::EntityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AuditLogs {
    Table,
    Id,
    Action,
    EntityType,
    EntityId,
    PerformedBy,
    IpAddress,
    Details,
    Description,
    CreatedAt,
}
