pub mod amortization;
pub mod calendar;
pub mod config;
pub mod costs;
pub mod eligible_base;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod rates;
pub mod redistribution;
pub mod subsidy;
pub mod types;

#[cfg(feature = "tax_credit")]
pub mod tax_credit;

pub use engine::EntitlementEngine;
pub use error::EntitlementError;
pub use types::*;

/// Standard result type for all entitlement operations
pub type EntitlementResult<T> = Result<T, EntitlementError>;
