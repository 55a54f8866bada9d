//! Database connection setup and schema modules

pub mod entities;
pub mod migrator;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Connection settings for the billing store
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SeaORM connection URL, e.g. `sqlite://./tirta.db?mode=rwc`
    pub url: String,
    /// Pool size. In-memory SQLite needs exactly one connection so every
    /// query lands on the same database instance.
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
        }
    }

    /// Private in-memory database; used by the test fixtures.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("sqlite://./tirta.db?mode=rwc")
    }
}

/// Open the connection pool described by `config`. Migrations are run
/// separately by the caller.
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(config.url.as_str());
    opts.max_connections(config.max_connections);

    let db = Database::connect(opts).await?;
    info!(url = %config.url, "database connected");
    Ok(db)
}
