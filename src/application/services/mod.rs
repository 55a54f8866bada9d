pub mod audit;
pub mod bills;
pub mod customers;
pub mod readings;
pub mod settings;

pub use audit::{AuditAction, AuditLogService, NewAuditLog};
pub use bills::{BillDetail, BillService, PaymentReceipt, PendingBill};
pub use customers::{CustomerDetail, CustomerService, UpdateCustomer};
pub use readings::{MeterReadingService, PeriodReport, ReadingWithBill};
pub use settings::{SettingView, SettingsService};
