//! Subsidy entitlement and its allocation over reporting periods.
//!
//! Flat grants are allocated by elapsed months of the validity window;
//! detailed grants by each period's share of the eligible base. Caps apply
//! in a fixed order: eligible-base cap, then rate, then amount cap.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthWindow;
use crate::config::{SubsidyConfig, SubsidyMode};
use crate::costs::CostBook;
use crate::eligible_base::eligible_base_total;
use crate::types::{Money, MonthYear, Period, Rate};
use crate::EntitlementResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A subsidy's total entitlement and what it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyPlan {
    pub subsidy: String,
    pub flat: bool,
    pub validity: MonthWindow,
    /// Eligible base over the validity window (zero for flat grants)
    pub eligible_base: Money,
    /// Eligible base after `max_eligible_base`
    pub capped_base: Money,
    pub total_entitlement: Money,
}

/// The part of a subsidy attributed to one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyAllocation {
    pub subsidy: String,
    pub period: Period,
    pub total_entitlement: Money,
    /// Fraction of the entitlement attributed to the period
    pub share: Rate,
    pub amount: Money,
    /// Months of the period inside the validity window
    pub covered_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleLine {
    pub month: MonthYear,
    pub amount: Money,
}

/// Month-by-month allocation over a subsidy's validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidySchedule {
    pub plan: SubsidyPlan,
    pub lines: Vec<ScheduleLine>,
    pub allocated_total: Money,
}

// ---------------------------------------------------------------------------
// Entitlement
// ---------------------------------------------------------------------------

fn cap(value: Money, ceiling: Option<Money>) -> Money {
    match ceiling {
        Some(c) => value.min(c),
        None => value,
    }
}

/// Compute the total entitlement of `config` for a project.
///
/// `costs` must cover the years of the validity window.
pub fn plan(
    config: &SubsidyConfig,
    costs: &CostBook,
    project: &MonthWindow,
) -> EntitlementResult<SubsidyPlan> {
    config.validate()?;
    let validity = config.validity_window(project)?;

    let (eligible_base, capped_base, total) = match config.mode {
        SubsidyMode::Flat { amount } => (Decimal::ZERO, Decimal::ZERO, cap(amount, config.max_amount)),
        SubsidyMode::Detailed { rate_percent } => {
            let base = eligible_base_total(
                costs,
                config,
                &Period::Window {
                    start: validity.start,
                    end: validity.end,
                },
            );
            let capped = cap(base, config.max_eligible_base);
            let amount = cap(capped * rate_percent / dec!(100), config.max_amount);
            (base, capped, amount)
        }
    };

    Ok(SubsidyPlan {
        subsidy: config.name.clone(),
        flat: config.is_flat(),
        validity,
        eligible_base,
        capped_base,
        total_entitlement: total.max(Decimal::ZERO),
    })
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Attribute part of `plan` to `period`.
///
/// The period is first clipped to the validity window; the share is the
/// clipped period's months (flat) or eligible base (detailed) over the
/// window's. Zero denominators yield a zero share.
pub fn allocate(
    plan: &SubsidyPlan,
    config: &SubsidyConfig,
    costs: &CostBook,
    period: &Period,
) -> SubsidyAllocation {
    let requested = MonthWindow::for_period(period, &costs.project);
    let mut allocation = SubsidyAllocation {
        subsidy: plan.subsidy.clone(),
        period: *period,
        total_entitlement: plan.total_entitlement,
        share: Decimal::ZERO,
        amount: Decimal::ZERO,
        covered_months: 0,
    };

    let Some(overlap) = requested.intersect(&plan.validity) else {
        return allocation;
    };
    allocation.covered_months = overlap.month_count();

    let (part, whole) = if plan.flat {
        (
            Decimal::from(overlap.month_count()),
            Decimal::from(plan.validity.month_count()),
        )
    } else {
        let part = eligible_base_total(
            costs,
            config,
            &Period::Window {
                start: overlap.start,
                end: overlap.end,
            },
        );
        (part, plan.eligible_base)
    };
    if whole.is_zero() {
        return allocation;
    }

    allocation.share = part / whole;
    allocation.amount = plan.total_entitlement * part / whole;
    allocation
}

/// Allocate `plan` to every month of its validity window.
pub fn schedule(plan: &SubsidyPlan, config: &SubsidyConfig, costs: &CostBook) -> SubsidySchedule {
    let lines: Vec<ScheduleLine> = plan
        .validity
        .months()
        .map(|month| ScheduleLine {
            month,
            amount: allocate(plan, config, costs, &Period::Month { month }).amount,
        })
        .collect();
    let allocated_total = lines.iter().map(|l| l.amount).sum();
    SubsidySchedule {
        plan: plan.clone(),
        lines,
        allocated_total,
    }
}
