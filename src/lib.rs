//! # Tirta Billing
//!
//! Billing core for a small community water utility: tiered tariff
//! calculation, meter reading ingestion, payment reconciliation and a
//! customer ledger, all backed by SQLite through SeaORM.
//!
//! ## Architecture
//!
//! - **domain**: Pure business types and math (tariff, settlement, periods)
//! - **application**: Transactional services over the schema
//! - **infrastructure**: Database connection, entities and migrations
//! - **shared**: Cross-cutting helpers (pagination)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, init_tracing, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};
pub use infrastructure::database::migrator::Migrator;

// Re-export the service layer
pub use application::{
    AuditLogService, BillService, CustomerService, MeterReadingService, SettingsService,
};
