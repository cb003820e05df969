//! A [`LedgerReader`] over an in-memory snapshot, loadable from JSON.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExpenseKind, InvestmentRecord, LaborEntry, LedgerReader};
use crate::calendar::MonthWindow;
use crate::config::{CategoryRate, SubsidyConfig, TaxCreditCoefficients};
use crate::error::EntitlementError;
use crate::types::{Money, MonthYear};
use crate::EntitlementResult;

// ---------------------------------------------------------------------------
// Snapshot records
// ---------------------------------------------------------------------------

/// Everything the engine may read, as exported by the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub category_rates: Vec<CategoryRateRecord>,
    #[serde(default)]
    pub tax_credit_coefficients: Vec<TaxCreditCoefficients>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub start: MonthYear,
    pub end: MonthYear,
    #[serde(default)]
    pub labor: Vec<LaborRecord>,
    #[serde(default)]
    pub external_expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub other_expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub investments: Vec<InvestmentRecord>,
    #[serde(default)]
    pub subsidies: Vec<SubsidyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborRecord {
    pub year: i32,
    pub member_id: String,
    pub category: String,
    pub month: u32,
    pub days: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub year: i32,
    pub month: u32,
    pub amount: Money,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRateRecord {
    pub category: String,
    pub year: i32,
    pub charged_rate: Money,
    pub production_rate: Money,
    pub complete_rate: Money,
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    snapshot: LedgerSnapshot,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> EntitlementResult<Self> {
        let snapshot: LedgerSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn project_ids(&self) -> Vec<String> {
        self.snapshot.projects.iter().map(|p| p.id.clone()).collect()
    }

    pub fn add_project(&mut self, id: &str, start: MonthYear, end: MonthYear) -> &mut Self {
        self.snapshot.projects.push(ProjectRecord {
            id: id.to_string(),
            start,
            end,
            labor: Vec::new(),
            external_expenses: Vec::new(),
            other_expenses: Vec::new(),
            investments: Vec::new(),
            subsidies: Vec::new(),
        });
        self
    }

    pub fn add_labor(
        &mut self,
        project_id: &str,
        year: i32,
        entry: LaborEntry,
    ) -> EntitlementResult<&mut Self> {
        self.project_mut(project_id)?.labor.push(LaborRecord {
            year,
            member_id: entry.member_id,
            category: entry.category,
            month: entry.month,
            days: entry.days,
        });
        Ok(self)
    }

    pub fn add_expense(
        &mut self,
        project_id: &str,
        kind: ExpenseKind,
        year: i32,
        month: u32,
        amount: Money,
    ) -> EntitlementResult<&mut Self> {
        let record = ExpenseRecord {
            year,
            month,
            amount,
            label: String::new(),
        };
        let project = self.project_mut(project_id)?;
        match kind {
            ExpenseKind::External => project.external_expenses.push(record),
            ExpenseKind::Other => project.other_expenses.push(record),
        }
        Ok(self)
    }

    pub fn add_investment(
        &mut self,
        project_id: &str,
        investment: InvestmentRecord,
    ) -> EntitlementResult<&mut Self> {
        self.project_mut(project_id)?.investments.push(investment);
        Ok(self)
    }

    pub fn add_subsidy(
        &mut self,
        project_id: &str,
        config: SubsidyConfig,
    ) -> EntitlementResult<&mut Self> {
        self.project_mut(project_id)?.subsidies.push(config);
        Ok(self)
    }

    pub fn add_category_rate(&mut self, category: &str, year: i32, rate: CategoryRate) -> &mut Self {
        self.snapshot.category_rates.push(CategoryRateRecord {
            category: category.to_string(),
            year,
            charged_rate: rate.charged_rate,
            production_rate: rate.production_rate,
            complete_rate: rate.complete_rate,
        });
        self
    }

    pub fn add_tax_credit_coefficients(&mut self, coefficients: TaxCreditCoefficients) -> &mut Self {
        self.snapshot.tax_credit_coefficients.push(coefficients);
        self
    }

    fn project(&self, project_id: &str) -> EntitlementResult<&ProjectRecord> {
        self.snapshot
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| EntitlementError::UnknownProject(project_id.to_string()))
    }

    fn project_mut(&mut self, project_id: &str) -> EntitlementResult<&mut ProjectRecord> {
        self.snapshot
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| EntitlementError::UnknownProject(project_id.to_string()))
    }
}

impl LedgerReader for InMemoryLedger {
    fn project_window(&self, project_id: &str) -> EntitlementResult<MonthWindow> {
        let project = self.project(project_id)?;
        // Inverted windows are passed through; the engine reports them.
        Ok(MonthWindow {
            start: project.start,
            end: project.end,
        })
    }

    fn labor_entries(&self, project_id: &str, year: i32) -> EntitlementResult<Vec<LaborEntry>> {
        Ok(self
            .project(project_id)?
            .labor
            .iter()
            .filter(|r| r.year == year)
            .map(|r| LaborEntry {
                member_id: r.member_id.clone(),
                category: r.category.clone(),
                month: r.month,
                days: r.days,
            })
            .collect())
    }

    fn category_rate(&self, category: &str, year: i32) -> EntitlementResult<Option<CategoryRate>> {
        Ok(self
            .snapshot
            .category_rates
            .iter()
            .find(|r| r.category == category && r.year == year)
            .map(|r| CategoryRate {
                charged_rate: r.charged_rate,
                production_rate: r.production_rate,
                complete_rate: r.complete_rate,
            }))
    }

    fn expenses(
        &self,
        project_id: &str,
        year: i32,
        kind: ExpenseKind,
    ) -> EntitlementResult<BTreeMap<u32, Money>> {
        let project = self.project(project_id)?;
        let rows = match kind {
            ExpenseKind::External => &project.external_expenses,
            ExpenseKind::Other => &project.other_expenses,
        };
        let mut by_month: BTreeMap<u32, Money> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.year == year) {
            *by_month.entry(row.month).or_insert(Decimal::ZERO) += row.amount;
        }
        Ok(by_month)
    }

    fn investments(&self, project_id: &str) -> EntitlementResult<Vec<InvestmentRecord>> {
        Ok(self.project(project_id)?.investments.clone())
    }

    fn subsidy_configs(&self, project_id: &str) -> EntitlementResult<Vec<SubsidyConfig>> {
        Ok(self.project(project_id)?.subsidies.clone())
    }

    fn tax_credit_coefficients(
        &self,
        year: i32,
    ) -> EntitlementResult<Option<TaxCreditCoefficients>> {
        Ok(self
            .snapshot
            .tax_credit_coefficients
            .iter()
            .find(|c| c.year == year)
            .copied())
    }

    fn available_tax_credit_coefficients(&self) -> EntitlementResult<Vec<TaxCreditCoefficients>> {
        Ok(self.snapshot.tax_credit_coefficients.clone())
    }
}
