//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_customers;
mod m20250801_000002_create_meter_readings;
mod m20250801_000003_create_bills;
mod m20250801_000004_create_bill_items;
mod m20250801_000005_create_settings;
mod m20250801_000006_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_customers::Migration),
            Box::new(m20250801_000002_create_meter_readings::Migration),
            Box::new(m20250801_000003_create_bills::Migration),
            Box::new(m20250801_000004_create_bill_items::Migration),
            Box::new(m20250801_000005_create_settings::Migration),
            Box::new(m20250801_000006_create_audit_logs::Migration),
        ]
    }
}
