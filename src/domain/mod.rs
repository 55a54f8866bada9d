//! Core business types: errors, identities, periods, tariffs, settlement

pub mod actor;
pub mod error;
pub mod payment;
pub mod period;
pub mod tariff;

pub use actor::Actor;
pub use error::{DomainError, DomainResult};
pub use payment::{settle, PaymentStatus, Settlement};
pub use period::Period;
pub use tariff::{calculate_charges, ChargeBreakdown, ChargeKind, ChargeLine, TariffRates};
