//! Application layer: transactional services over the entity schema

pub mod services;

pub use services::{
    AuditLogService, BillService, CustomerService, MeterReadingService, SettingsService,
};
