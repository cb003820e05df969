//! Straight-line amortization of project investments.
//!
//! Dotation starts the month after purchase, runs for `duration_years × 12`
//! months and is clipped to the project's end. Investments never interact;
//! period amounts are plain sums over every schedule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthWindow;
use crate::error::EntitlementError;
use crate::ledger::InvestmentRecord;
use crate::redistribution::ResolvedSeries;
use crate::types::{push_warning, Money, MonthYear, Period};
use crate::EntitlementResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An investment with a parsed purchase month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    pub label: String,
    pub amount: Money,
    pub purchase: MonthYear,
    pub duration_years: u32,
}

impl Investment {
    pub fn from_record(record: &InvestmentRecord) -> EntitlementResult<Self> {
        let purchase = MonthYear::parse(&record.purchase_date)?;
        if record.duration_years == 0 {
            return Err(EntitlementError::InvalidInput {
                field: "duration_years".into(),
                reason: "Amortization duration must be at least one year".into(),
            });
        }
        Ok(Self {
            label: record.label.clone(),
            amount: record.amount,
            purchase,
            duration_years: record.duration_years,
        })
    }

    pub fn monthly_dotation(&self) -> Money {
        if self.duration_years == 0 {
            return Decimal::ZERO;
        }
        self.amount / Decimal::from(self.duration_years as u64 * 12)
    }
}

/// One month of dotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationLine {
    pub month: MonthYear,
    pub dotation: Money,
}

/// Monthly dotation stream of one investment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub label: String,
    pub amount: Money,
    pub purchase: MonthYear,
    pub duration_years: u32,
    pub monthly_dotation: Money,
    /// First dotation month; `None` when nothing falls in the project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<MonthYear>,
    /// Last dotation month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<MonthYear>,
    pub lines: Vec<AmortizationLine>,
}

impl AmortizationSchedule {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.dotation).sum()
    }

    pub fn amount_in(&self, window: &MonthWindow) -> Money {
        self.lines
            .iter()
            .filter(|l| window.contains(l.month))
            .map(|l| l.dotation)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Build the dotation schedule of `investment` for a project ending at
/// `project_end`.
pub fn amortize(investment: &Investment, project_end: MonthYear) -> AmortizationSchedule {
    let start = investment.purchase.next();
    let theoretical_end = investment
        .purchase
        .add_months(investment.duration_years as i64 * 12);
    let effective_end = theoretical_end.min(project_end);
    let monthly_dotation = investment.monthly_dotation();

    let mut schedule = AmortizationSchedule {
        label: investment.label.clone(),
        amount: investment.amount,
        purchase: investment.purchase,
        duration_years: investment.duration_years,
        monthly_dotation,
        start: None,
        end: None,
        lines: Vec::new(),
    };

    if start > project_end || start > effective_end {
        return schedule;
    }

    schedule.start = Some(start);
    schedule.end = Some(effective_end);
    schedule.lines = MonthWindow {
        start,
        end: effective_end,
    }
    .months()
    .map(|month| AmortizationLine {
        month,
        dotation: monthly_dotation,
    })
    .collect();
    schedule
}

/// Dotation of one schedule falling in `period`, within the project.
pub fn amortization_for_period(
    schedule: &AmortizationSchedule,
    period: &Period,
    project: &MonthWindow,
) -> Money {
    match MonthWindow::for_period(period, project).intersect(project) {
        Some(window) => schedule.amount_in(&window),
        None => Decimal::ZERO,
    }
}

/// Schedules for every usable investment record. Malformed purchase dates
/// and zero durations skip the record with a warning.
pub fn schedules_from_records(
    records: &[InvestmentRecord],
    project_end: MonthYear,
    warnings: &mut Vec<String>,
) -> Vec<AmortizationSchedule> {
    let mut schedules = Vec::with_capacity(records.len());
    for record in records {
        match Investment::from_record(record) {
            Ok(investment) => schedules.push(amortize(&investment, project_end)),
            Err(e) => {
                tracing::warn!(
                    label = %record.label,
                    purchase_date = %record.purchase_date,
                    error = %e,
                    "skipping investment"
                );
                push_warning(
                    warnings,
                    format!(
                        "Investment '{}' ({}) skipped: {e}",
                        record.label, record.purchase_date
                    ),
                );
            }
        }
    }
    schedules
}

/// Combined dotation per month of `year` across all schedules.
pub fn yearly_series(schedules: &[AmortizationSchedule], year: i32) -> ResolvedSeries {
    let mut series = ResolvedSeries::empty(year);
    for line in schedules.iter().flat_map(|s| s.lines.iter()) {
        if line.month.year() == year {
            series.months[line.month.month() as usize - 1] += line.dotation;
            series.total += line.dotation;
        }
    }
    series
}
