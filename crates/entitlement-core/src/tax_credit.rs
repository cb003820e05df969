//! National R&D tax credit.
//!
//! `base = labor × k1 + amortization × k2 − subsidies`, `credit = base × k3`
//! when the base is positive. Components are summed month by month over the
//! project's active months so subsidy allocations line up with their own
//! monthly redistribution; the floor at zero applies per project-year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CoefficientFallback, SubsidyConfig, TaxCreditCoefficients};
use crate::costs::{CostBook, Dimension};
use crate::ledger::LedgerReader;
use crate::subsidy::{allocate, SubsidyPlan};
use crate::types::{push_warning, Money, MonthYear, Period, ProjectId};
use crate::EntitlementResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Coefficients used for a year, and whether they were borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCoefficients {
    pub coefficients: TaxCreditCoefficients,
    pub fallback: bool,
}

/// A subsidy whose allocations are deducted from the base.
pub struct SubsidyDeduction<'a> {
    pub plan: &'a SubsidyPlan,
    pub config: &'a SubsidyConfig,
    pub costs: &'a CostBook,
}

/// Credit for one project over the part of a period inside one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreditYear {
    pub year: i32,
    /// Active project months of the period in this year
    pub months: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<ResolvedCoefficients>,
    pub labor_cost: Money,
    pub amortization: Money,
    pub subsidies: Money,
    pub base: Money,
    pub credit: Money,
}

/// Credit for one project over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreditBreakdown {
    pub project_id: ProjectId,
    pub period: Period,
    pub years: Vec<TaxCreditYear>,
    pub labor_cost: Money,
    pub amortization: Money,
    pub subsidies: Money,
    pub base: Money,
    pub credit: Money,
}

impl TaxCreditBreakdown {
    pub fn from_years(project_id: &str, period: Period, years: Vec<TaxCreditYear>) -> Self {
        let mut breakdown = Self {
            project_id: project_id.to_string(),
            period,
            years: Vec::new(),
            labor_cost: Decimal::ZERO,
            amortization: Decimal::ZERO,
            subsidies: Decimal::ZERO,
            base: Decimal::ZERO,
            credit: Decimal::ZERO,
        };
        for y in &years {
            breakdown.labor_cost += y.labor_cost;
            breakdown.amortization += y.amortization;
            breakdown.subsidies += y.subsidies;
            breakdown.base += y.base;
            breakdown.credit += y.credit;
        }
        breakdown.years = years;
        breakdown
    }
}

/// Credit over several projects; bases and credits are summed separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreditSummary {
    pub period: Period,
    pub projects: Vec<TaxCreditBreakdown>,
    pub base: Money,
    pub credit: Money,
}

impl TaxCreditSummary {
    pub fn from_projects(period: Period, projects: Vec<TaxCreditBreakdown>) -> Self {
        let base = projects.iter().map(|p| p.base).sum();
        let credit = projects.iter().map(|p| p.credit).sum();
        Self {
            period,
            projects,
            base,
            credit,
        }
    }
}

// ---------------------------------------------------------------------------
// Formula
// ---------------------------------------------------------------------------

/// `base × k3`, never negative.
pub fn credit_for_base(base: Money, k3: Money) -> Money {
    if base > Decimal::ZERO {
        (base * k3).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Look up the coefficients of `year`, applying the fallback policy when the
/// year has none.
pub fn resolve_coefficients<L: LedgerReader + ?Sized>(
    ledger: &L,
    year: i32,
    fallback: CoefficientFallback,
    warnings: &mut Vec<String>,
) -> EntitlementResult<Option<ResolvedCoefficients>> {
    if let Some(coefficients) = ledger.tax_credit_coefficients(year)? {
        return Ok(Some(ResolvedCoefficients {
            coefficients,
            fallback: false,
        }));
    }

    let available = match fallback {
        CoefficientFallback::Disabled => Vec::new(),
        CoefficientFallback::Nearest => ledger.available_tax_credit_coefficients()?,
    };
    match fallback.pick(year, &available) {
        Some(coefficients) => {
            tracing::warn!(
                year,
                borrowed_from = coefficients.year,
                "no tax-credit coefficients; using another year's"
            );
            push_warning(
                warnings,
                format!(
                    "No tax-credit coefficients for {year}; using those of {}",
                    coefficients.year
                ),
            );
            Ok(Some(ResolvedCoefficients {
                coefficients,
                fallback: true,
            }))
        }
        None => {
            tracing::warn!(year, "no tax-credit coefficients; credit is zero");
            push_warning(
                warnings,
                format!("No tax-credit coefficients for {year}; credit counted as 0"),
            );
            Ok(None)
        }
    }
}

/// Credit for the given active `months` of `year`.
pub fn compute_year(
    year: i32,
    months: &[u32],
    costs: &CostBook,
    deductions: &[SubsidyDeduction<'_>],
    coefficients: Option<ResolvedCoefficients>,
) -> TaxCreditYear {
    let mut labor_cost = Decimal::ZERO;
    let mut amortization = Decimal::ZERO;
    let mut subsidies = Decimal::ZERO;

    for &month in months {
        labor_cost += costs.month_value(Dimension::Labor, year, month);
        amortization += costs.month_value(Dimension::Amortization, year, month);
        let Ok(at) = MonthYear::new(year, month) else {
            continue;
        };
        for d in deductions {
            subsidies += allocate(d.plan, d.config, d.costs, &Period::Month { month: at }).amount;
        }
    }

    let (base, credit) = match coefficients {
        Some(c) => {
            let k = c.coefficients;
            let base = labor_cost * k.k1 + amortization * k.k2 - subsidies;
            (base, credit_for_base(base, k.k3))
        }
        None => (Decimal::ZERO, Decimal::ZERO),
    };

    TaxCreditYear {
        year,
        months: months.to_vec(),
        coefficients,
        labor_cost,
        amortization,
        subsidies,
        base,
        credit,
    }
}
