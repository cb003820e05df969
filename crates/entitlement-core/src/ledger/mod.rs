//! Read-only boundary to the host application's ledger.
//!
//! The engine never constructs queries or owns ledger rows; it asks a
//! [`LedgerReader`] for typed records and derives everything else.

pub mod memory;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthWindow;
use crate::config::{CategoryRate, SubsidyConfig, TaxCreditCoefficients};
use crate::types::Money;
use crate::EntitlementResult;

pub use memory::{InMemoryLedger, LedgerSnapshot};

/// One labor-time row: days worked by a member in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborEntry {
    pub member_id: String,
    pub category: String,
    /// Calendar month, 1..=12; rows outside that range are skipped
    pub month: u32,
    pub days: Decimal,
}

/// The two expense ledgers. The engine treats them alike; only the subsidy
/// rule that gates them differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    External,
    Other,
}

/// A capital purchase as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    #[serde(default)]
    pub label: String,
    pub amount: Money,
    /// Raw month-year text; unparsable values skip the investment
    pub purchase_date: String,
    pub duration_years: u32,
}

/// Storage-agnostic read access to everything the engine consumes.
pub trait LedgerReader {
    fn project_window(&self, project_id: &str) -> EntitlementResult<MonthWindow>;

    fn labor_entries(&self, project_id: &str, year: i32) -> EntitlementResult<Vec<LaborEntry>>;

    fn category_rate(&self, category: &str, year: i32) -> EntitlementResult<Option<CategoryRate>>;

    /// Amounts aggregated per month (1..=12) for one expense ledger.
    fn expenses(
        &self,
        project_id: &str,
        year: i32,
        kind: ExpenseKind,
    ) -> EntitlementResult<BTreeMap<u32, Money>>;

    fn investments(&self, project_id: &str) -> EntitlementResult<Vec<InvestmentRecord>>;

    fn subsidy_configs(&self, project_id: &str) -> EntitlementResult<Vec<SubsidyConfig>>;

    fn tax_credit_coefficients(&self, year: i32)
        -> EntitlementResult<Option<TaxCreditCoefficients>>;

    /// Every stored coefficient set, consulted only by the year fallback.
    fn available_tax_credit_coefficients(&self) -> EntitlementResult<Vec<TaxCreditCoefficients>> {
        Ok(Vec::new())
    }
}
