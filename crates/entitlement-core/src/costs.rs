//! Per-project monthly cost picture.
//!
//! A [`CostBook`] reads the ledger once per project-year and keeps every
//! dimension as a [`ResolvedSeries`], so downstream components only ever ask
//! "how much in this period".

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{yearly_series, AmortizationSchedule};
use crate::calendar::MonthWindow;
use crate::config::CostBasis;
use crate::ledger::{ExpenseKind, LedgerReader};
use crate::rates::RateCache;
use crate::redistribution::{drop_invalid_months, group_needs_redistribution, ResolvedSeries};
use crate::types::{push_warning, Money, MonthYear, Period};
use crate::EntitlementResult;

/// The four cost dimensions an eligible base is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Labor,
    External,
    Other,
    Amortization,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Labor,
        Dimension::External,
        Dimension::Other,
        Dimension::Amortization,
    ];
}

/// Resolved monthly costs of one project-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearCosts {
    pub year: i32,
    pub active_months: Vec<u32>,
    pub labor: ResolvedSeries,
    pub external: ResolvedSeries,
    pub other: ResolvedSeries,
    pub amortization: ResolvedSeries,
}

impl YearCosts {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            active_months: Vec::new(),
            labor: ResolvedSeries::empty(year),
            external: ResolvedSeries::empty(year),
            other: ResolvedSeries::empty(year),
            amortization: ResolvedSeries::empty(year),
        }
    }

    /// Year figure restricted to the active months. A redistributed series
    /// only fills active months, so its exact total is kept.
    pub fn active_total(&self, dimension: Dimension) -> Money {
        let series = self.series(dimension);
        if series.redistributed {
            series.total
        } else {
            series.sum_months(self.active_months.iter().copied())
        }
    }

    pub fn series(&self, dimension: Dimension) -> &ResolvedSeries {
        match dimension {
            Dimension::Labor => &self.labor,
            Dimension::External => &self.external,
            Dimension::Other => &self.other,
            Dimension::Amortization => &self.amortization,
        }
    }
}

/// Resolved costs of one project, for a set of years and one labor basis.
#[derive(Debug, Clone)]
pub struct CostBook {
    pub project: MonthWindow,
    pub basis: CostBasis,
    years: BTreeMap<i32, YearCosts>,
}

impl CostBook {
    #[allow(clippy::too_many_arguments)]
    pub fn load<L: LedgerReader + ?Sized>(
        ledger: &L,
        rates: &mut RateCache,
        project_id: &str,
        project: MonthWindow,
        years: impl IntoIterator<Item = i32>,
        basis: CostBasis,
        schedules: &[AmortizationSchedule],
        warnings: &mut Vec<String>,
    ) -> EntitlementResult<Self> {
        let mut book = Self {
            project,
            basis,
            years: BTreeMap::new(),
        };
        for year in years {
            if book.years.contains_key(&year) {
                continue;
            }
            let costs = load_year(ledger, rates, project_id, &project, year, basis, schedules, warnings)?;
            book.years.insert(year, costs);
        }
        Ok(book)
    }

    pub fn year(&self, year: i32) -> Option<&YearCosts> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = &YearCosts> {
        self.years.values()
    }

    /// Value of one dimension for a month. Months outside the project and
    /// unloaded years count as zero.
    pub fn month_value(&self, dimension: Dimension, year: i32, month: u32) -> Money {
        let inside = MonthYear::new(year, month)
            .map(|m| self.project.contains(m))
            .unwrap_or(false);
        if !inside {
            return Decimal::ZERO;
        }
        self.years
            .get(&year)
            .map(|y| y.series(dimension).month(month))
            .unwrap_or(Decimal::ZERO)
    }

    /// Value of one dimension over the project months of `year`.
    pub fn year_value(&self, dimension: Dimension, year: i32) -> Money {
        self.years
            .get(&year)
            .map(|y| y.active_total(dimension))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn window_value(&self, dimension: Dimension, window: &MonthWindow) -> Money {
        window
            .months()
            .map(|m| self.month_value(dimension, m.year(), m.month()))
            .sum()
    }

    /// Value of one dimension over a period.
    ///
    /// Only project months count. Months and windows sum monthly values;
    /// years and the whole project use per-year figures, which keep a
    /// redistributed total exact.
    pub fn value(&self, dimension: Dimension, period: &Period) -> Money {
        match *period {
            Period::Month { month } => self.month_value(dimension, month.year(), month.month()),
            Period::Year { year } => self.year_value(dimension, year),
            Period::WholeProject => self
                .project
                .years()
                .map(|y| self.year_value(dimension, y))
                .sum(),
            Period::Window { .. } => {
                self.window_value(dimension, &MonthWindow::for_period(period, &self.project))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cost picture
// ---------------------------------------------------------------------------

/// One month of the reconstructed cost picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPictureMonth {
    pub month: MonthYear,
    pub active: bool,
    pub labor: Money,
    pub external: Money,
    pub other: Money,
    pub amortization: Money,
    pub total: Money,
}

/// Reconstructed monthly costs of a project-year, as reporting shows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPicture {
    pub project_id: String,
    pub year: i32,
    pub basis: CostBasis,
    pub active_months: Vec<u32>,
    pub labor_redistributed: bool,
    pub external_redistributed: bool,
    pub other_redistributed: bool,
    pub months: Vec<CostPictureMonth>,
    pub labor: Money,
    pub external: Money,
    pub other: Money,
    pub amortization: Money,
    pub total: Money,
}

impl CostPicture {
    pub fn from_year(project_id: &str, basis: CostBasis, costs: &YearCosts) -> Self {
        let months: Vec<CostPictureMonth> = (1..=12u32)
            .map(|m| {
                let labor = costs.labor.month(m);
                let external = costs.external.month(m);
                let other = costs.other.month(m);
                let amortization = costs.amortization.month(m);
                CostPictureMonth {
                    month: MonthYear::from_ordinal(costs.year as i64 * 12 + m as i64 - 1),
                    active: costs.active_months.contains(&m),
                    labor,
                    external,
                    other,
                    amortization,
                    total: labor + external + other + amortization,
                }
            })
            .collect();

        let labor = costs.labor.total;
        let external = costs.external.total;
        let other = costs.other.total;
        let amortization = costs.amortization.total;
        Self {
            project_id: project_id.to_string(),
            year: costs.year,
            basis,
            active_months: costs.active_months.clone(),
            labor_redistributed: costs.labor.redistributed,
            external_redistributed: costs.external.redistributed,
            other_redistributed: costs.other.redistributed,
            months,
            labor,
            external,
            other,
            amortization,
            total: labor + external + other + amortization,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn load_year<L: LedgerReader + ?Sized>(
    ledger: &L,
    rates: &mut RateCache,
    project_id: &str,
    project: &MonthWindow,
    year: i32,
    basis: CostBasis,
    schedules: &[AmortizationSchedule],
    warnings: &mut Vec<String>,
) -> EntitlementResult<YearCosts> {
    let active_months = project.active_months(year);
    tracing::debug!(project_id, year, active = active_months.len(), "loading year costs");

    let labor = load_labor(ledger, rates, project_id, year, basis, &active_months, warnings)?;

    let external = ledger.expenses(project_id, year, ExpenseKind::External)?;
    let external = drop_invalid_months(external, &format!("External expenses {year}"), warnings);
    let other = ledger.expenses(project_id, year, ExpenseKind::Other)?;
    let other = drop_invalid_months(other, &format!("Other expenses {year}"), warnings);

    Ok(YearCosts {
        year,
        labor,
        external: ResolvedSeries::resolve(year, &external, &active_months),
        other: ResolvedSeries::resolve(year, &other, &active_months),
        amortization: yearly_series(schedules, year),
        active_months,
    })
}

/// Labor priced at the category rate of the year. The spread decision is
/// taken on recorded days, per member/category pair, before pricing.
fn load_labor<L: LedgerReader + ?Sized>(
    ledger: &L,
    rates: &mut RateCache,
    project_id: &str,
    year: i32,
    basis: CostBasis,
    active_months: &[u32],
    warnings: &mut Vec<String>,
) -> EntitlementResult<ResolvedSeries> {
    let mut pairs: HashMap<(String, String), BTreeMap<u32, Decimal>> = HashMap::new();
    for entry in ledger.labor_entries(project_id, year)? {
        if !(1..=12).contains(&entry.month) {
            tracing::warn!(member = %entry.member_id, month = entry.month, "skipping labor row");
            push_warning(
                warnings,
                format!(
                    "Labor {year}: skipped row for member '{}' with invalid month {}",
                    entry.member_id, entry.month
                ),
            );
            continue;
        }
        *pairs
            .entry((entry.member_id, entry.category))
            .or_default()
            .entry(entry.month)
            .or_insert(Decimal::ZERO) += entry.days;
    }

    let mut ordered: Vec<((String, String), BTreeMap<u32, Decimal>)> = pairs.into_iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    let day_maps: Vec<BTreeMap<u32, Decimal>> = ordered.iter().map(|(_, d)| d.clone()).collect();
    let spread = group_needs_redistribution(&day_maps);

    let mut labor = ResolvedSeries::empty(year);
    for ((_, category), days_by_month) in &ordered {
        let rate = match rates.resolve(ledger, category, year)? {
            Some(rate) => rate.rate_for(basis),
            None => {
                tracing::warn!(category = %category, year, "no cost rate; labor priced at zero");
                push_warning(
                    warnings,
                    format!("No cost rate for category '{category}' in {year}; labor priced at 0"),
                );
                Decimal::ZERO
            }
        };
        let money: BTreeMap<u32, Money> = days_by_month
            .iter()
            .map(|(month, days)| (*month, *days * rate))
            .collect();
        let part = if spread {
            ResolvedSeries::spread(year, money.values().copied().sum(), active_months)
        } else {
            ResolvedSeries::raw(year, &money)
        };
        labor.accumulate(&part);
    }
    labor.redistributed = spread;
    Ok(labor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryRate;
    use crate::ledger::{InMemoryLedger, LaborEntry};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn my(year: i32, month: u32) -> MonthYear {
        MonthYear::new(year, month).unwrap()
    }

    fn labor(member: &str, category: &str, month: u32, days: Decimal) -> LaborEntry {
        LaborEntry {
            member_id: member.into(),
            category: category.into(),
            month,
            days,
        }
    }

    fn ledger() -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new();
        ledger.add_project("P", my(2024, 1), my(2024, 12));
        ledger.add_category_rate(
            "engineer",
            2024,
            CategoryRate {
                charged_rate: dec!(400),
                production_rate: dec!(500),
                complete_rate: dec!(600),
            },
        );
        ledger
    }

    fn book(ledger: &InMemoryLedger, basis: CostBasis, warnings: &mut Vec<String>) -> CostBook {
        let project = ledger.project_window("P").unwrap();
        let mut rates = RateCache::new();
        CostBook::load(ledger, &mut rates, "P", project, [2024], basis, &[], warnings).unwrap()
    }

    #[test]
    fn test_single_month_labor_spread_over_year() {
        let mut ledger = ledger();
        ledger.add_labor("P", 2024, labor("alice", "engineer", 1, dec!(24))).unwrap();
        ledger.add_labor("P", 2024, labor("bob", "engineer", 6, dec!(12))).unwrap();

        let mut warnings = Vec::new();
        let book = book(&ledger, CostBasis::Charged, &mut warnings);
        let year = book.year(2024).unwrap();
        assert!(year.labor.redistributed);
        // (24 + 12) days × 400 = 14_400 over 12 months
        assert_eq!(year.labor.total, dec!(14400));
        assert_eq!(book.month_value(Dimension::Labor, 2024, 9), dec!(1200));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_one_dense_pair_disables_labor_spread() {
        let mut ledger = ledger();
        ledger.add_labor("P", 2024, labor("alice", "engineer", 1, dec!(24))).unwrap();
        ledger.add_labor("P", 2024, labor("bob", "engineer", 2, dec!(1))).unwrap();
        ledger.add_labor("P", 2024, labor("bob", "engineer", 3, dec!(1))).unwrap();

        let mut warnings = Vec::new();
        let book = book(&ledger, CostBasis::Complete, &mut warnings);
        assert!(!book.year(2024).unwrap().labor.redistributed);
        assert_eq!(book.month_value(Dimension::Labor, 2024, 1), dec!(14400));
        assert_eq!(book.month_value(Dimension::Labor, 2024, 4), Decimal::ZERO);
        assert_eq!(book.year_value(Dimension::Labor, 2024), dec!(15600));
    }

    #[test]
    fn test_missing_rate_prices_labor_at_zero_with_warning() {
        let mut ledger = ledger();
        ledger.add_labor("P", 2024, labor("carol", "intern", 2, dec!(10))).unwrap();
        ledger.add_labor("P", 2024, labor("carol", "intern", 3, dec!(10))).unwrap();

        let mut warnings = Vec::new();
        let book = book(&ledger, CostBasis::Charged, &mut warnings);
        assert_eq!(book.year_value(Dimension::Labor, 2024), Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("intern"));
    }

    #[test]
    fn test_expenses_and_period_values() {
        let mut ledger = ledger();
        ledger
            .add_expense("P", ExpenseKind::External, 2024, 2, dec!(12000))
            .unwrap();
        ledger.add_expense("P", ExpenseKind::Other, 2024, 2, dec!(50)).unwrap();
        ledger.add_expense("P", ExpenseKind::Other, 2024, 5, dec!(70)).unwrap();

        let mut warnings = Vec::new();
        let book = book(&ledger, CostBasis::Charged, &mut warnings);

        let june = Period::Month { month: my(2024, 6) };
        assert_eq!(book.value(Dimension::External, &june), dec!(1000));
        assert_eq!(book.value(Dimension::External, &Period::year(2024)), dec!(12000));
        assert_eq!(book.value(Dimension::Other, &june), Decimal::ZERO);
        assert_eq!(book.value(Dimension::Other, &Period::WholeProject), dec!(120));

        let q2 = Period::window(my(2024, 4), my(2024, 6)).unwrap();
        assert_eq!(book.value(Dimension::External, &q2), dec!(3000));
        assert_eq!(book.value(Dimension::Other, &q2), dec!(70));
    }

    #[test]
    fn test_months_outside_project_count_as_zero() {
        let mut ledger = InMemoryLedger::new();
        ledger.add_project("P", my(2024, 3), my(2024, 12));
        ledger
            .add_expense("P", ExpenseKind::External, 2024, 1, dec!(1000))
            .unwrap();
        ledger
            .add_expense("P", ExpenseKind::External, 2024, 5, dec!(1000))
            .unwrap();

        let mut warnings = Vec::new();
        let book = book(&ledger, CostBasis::Charged, &mut warnings);
        // the ledger figure is untouched
        assert_eq!(book.year(2024).unwrap().external.total, dec!(2000));
        assert_eq!(book.month_value(Dimension::External, 2024, 1), Decimal::ZERO);
        assert_eq!(book.year_value(Dimension::External, 2024), dec!(1000));
        assert_eq!(book.value(Dimension::External, &Period::WholeProject), dec!(1000));

        let early = Period::window(my(2024, 1), my(2024, 4)).unwrap();
        assert_eq!(book.value(Dimension::External, &early), Decimal::ZERO);
    }

    #[test]
    fn test_unloaded_year_is_zero() {
        let ledger = ledger();
        let mut warnings = Vec::new();
        let book = book(&ledger, CostBasis::Charged, &mut warnings);
        assert_eq!(book.year_value(Dimension::External, 2030), Decimal::ZERO);
    }
}
