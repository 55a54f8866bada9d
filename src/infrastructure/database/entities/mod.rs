//! SeaORM entity definitions

pub mod audit_log;
pub mod bill;
pub mod bill_item;
pub mod customer;
pub mod meter_reading;
pub mod setting;
