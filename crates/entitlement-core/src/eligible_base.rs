//! Coefficient-weighted eligible base (assiette) of a subsidy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DimensionRule, SubsidyConfig};
use crate::costs::{CostBook, Dimension};
use crate::types::{Money, Period, Rate};

/// One dimension's share of an eligible base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionContribution {
    pub dimension: Dimension,
    pub included: bool,
    /// Cost of the dimension over the period, before weighting
    pub raw: Money,
    /// Effective multiplier (labor: coefficient × charge coefficient)
    pub coefficient: Rate,
    /// Amount entering the base; zero when excluded
    pub weighted: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleBaseBreakdown {
    pub period: Period,
    pub labor: DimensionContribution,
    pub external: DimensionContribution,
    pub other: DimensionContribution,
    pub amortization: DimensionContribution,
    pub total: Money,
}

impl EligibleBaseBreakdown {
    pub fn contributions(&self) -> [&DimensionContribution; 4] {
        [&self.labor, &self.external, &self.other, &self.amortization]
    }
}

fn rule_for(config: &SubsidyConfig, dimension: Dimension) -> (DimensionRule, Rate) {
    match dimension {
        Dimension::Labor => (
            config.labor,
            config.labor.coefficient * config.charge_coefficient,
        ),
        Dimension::External => (config.external, config.external.coefficient),
        Dimension::Other => (config.other, config.other.coefficient),
        Dimension::Amortization => (config.amortization, config.amortization.coefficient),
    }
}

fn contribution(
    costs: &CostBook,
    config: &SubsidyConfig,
    dimension: Dimension,
    period: &Period,
) -> DimensionContribution {
    let (rule, coefficient) = rule_for(config, dimension);
    let raw = costs.value(dimension, period);
    DimensionContribution {
        dimension,
        included: rule.included,
        raw,
        coefficient,
        weighted: if rule.included {
            raw * coefficient
        } else {
            Decimal::ZERO
        },
    }
}

/// Eligible base of `config` over `period`, with its per-dimension detail.
pub fn eligible_base(costs: &CostBook, config: &SubsidyConfig, period: &Period) -> EligibleBaseBreakdown {
    let labor = contribution(costs, config, Dimension::Labor, period);
    let external = contribution(costs, config, Dimension::External, period);
    let other = contribution(costs, config, Dimension::Other, period);
    let amortization = contribution(costs, config, Dimension::Amortization, period);
    let total = labor.weighted + external.weighted + other.weighted + amortization.weighted;
    EligibleBaseBreakdown {
        period: *period,
        labor,
        external,
        other,
        amortization,
        total,
    }
}

/// Just the total, for callers that only need the figure.
pub fn eligible_base_total(costs: &CostBook, config: &SubsidyConfig, period: &Period) -> Money {
    Dimension::ALL
        .iter()
        .map(|d| contribution(costs, config, *d, period).weighted)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRate, CostBasis};
    use crate::ledger::{ExpenseKind, InMemoryLedger, LaborEntry, LedgerReader};
    use crate::rates::RateCache;
    use crate::types::MonthYear;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn my(year: i32, month: u32) -> MonthYear {
        MonthYear::new(year, month).unwrap()
    }

    fn book() -> CostBook {
        let mut ledger = InMemoryLedger::new();
        ledger.add_project("P", my(2024, 1), my(2024, 12));
        ledger.add_category_rate(
            "engineer",
            2024,
            CategoryRate {
                charged_rate: dec!(500),
                production_rate: dec!(500),
                complete_rate: dec!(500),
            },
        );
        for month in 1..=12 {
            ledger
                .add_labor(
                    "P",
                    2024,
                    LaborEntry {
                        member_id: "alice".into(),
                        category: "engineer".into(),
                        month,
                        days: dec!(2),
                    },
                )
                .unwrap();
        }
        ledger
            .add_expense("P", ExpenseKind::External, 2024, 1, dec!(12000))
            .unwrap();
        ledger.add_expense("P", ExpenseKind::Other, 2024, 3, dec!(600)).unwrap();
        ledger.add_expense("P", ExpenseKind::Other, 2024, 4, dec!(600)).unwrap();

        let project = ledger.project_window("P").unwrap();
        let mut rates = RateCache::new();
        let mut warnings = Vec::new();
        CostBook::load(
            &ledger,
            &mut rates,
            "P",
            project,
            [2024],
            CostBasis::Charged,
            &[],
            &mut warnings,
        )
        .unwrap()
    }

    #[test]
    fn test_only_included_dimensions_count() {
        let costs = book();
        let config = SubsidyConfig::detailed("g", dec!(50))
            .with_external(DimensionRule::included(Decimal::ONE));
        let june = Period::Month { month: my(2024, 6) };
        let base = eligible_base(&costs, &config, &june);
        assert_eq!(base.total, dec!(1000));
        assert_eq!(base.labor.raw, dec!(1000));
        assert_eq!(base.labor.weighted, Decimal::ZERO);
        assert!(!base.labor.included);
    }

    #[test]
    fn test_labor_uses_charge_coefficient() {
        let costs = book();
        let config = SubsidyConfig::detailed("g", dec!(50))
            .with_labor(DimensionRule::included(dec!(1.5)), dec!(1.2));
        let base = eligible_base(&costs, &config, &Period::year(2024));
        // 24 days × 500 = 12_000 × 1.5 × 1.2
        assert_eq!(base.labor.coefficient, dec!(1.8));
        assert_eq!(base.total, dec!(21600));
        assert_eq!(eligible_base_total(&costs, &config, &Period::year(2024)), dec!(21600));
    }

    #[test]
    fn test_all_dimensions_weighted() {
        let costs = book();
        let config = SubsidyConfig::detailed("g", dec!(50))
            .with_labor(DimensionRule::included(Decimal::ONE), Decimal::ONE)
            .with_external(DimensionRule::included(dec!(0.5)))
            .with_other(DimensionRule::included(dec!(2)));
        let april = Period::Month { month: my(2024, 4) };
        let base = eligible_base(&costs, &config, &april);
        // labor 1000 + external 1000 × 0.5 + other 600 × 2
        assert_eq!(base.total, dec!(2700));
        assert_eq!(base.contributions().len(), 4);
    }
}
