//! Shared test fixture: in-memory SQLite with migrations and default settings

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use tirta_billing::{init_database, DatabaseConfig, Migrator, SettingsService};

/// Fresh in-memory database, migrated and seeded.
pub async fn setup() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    SettingsService::new(db.clone())
        .ensure_defaults()
        .await
        .expect("seed default settings");
    db
}
