//! Sparse-versus-dense detection for monthly cost series.
//!
//! A series with exactly one populated month is a yearly figure typed into a
//! single month; it is spread uniformly over the project's active months.
//! Anything denser is authoritative and used verbatim, even when that leaves
//! active months at zero.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{push_warning, Money};

/// True iff exactly one month carries a non-zero value.
pub fn needs_redistribution(entries_by_month: &BTreeMap<u32, Money>) -> bool {
    populated_months(entries_by_month) == 1
}

/// Shared decision for series recorded independently but spread together
/// (labor: one series per member/category pair).
///
/// True when every populated series has exactly one month; a single
/// multi-month series keeps the whole group verbatim. Series with nothing
/// populated take no part in the decision.
pub fn group_needs_redistribution(series: &[BTreeMap<u32, Money>]) -> bool {
    let mut populated = series.iter().filter(|s| populated_months(s) > 0).peekable();
    populated.peek().is_some() && populated.all(needs_redistribution)
}

fn populated_months(entries_by_month: &BTreeMap<u32, Money>) -> usize {
    entries_by_month.values().filter(|v| !v.is_zero()).count()
}

/// Monthly values of one cost dimension for one project-year, after the
/// redistribution decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSeries {
    pub year: i32,
    /// Index 0 is January
    pub months: [Money; 12],
    /// Year figure; equals the recorded total when redistributed
    pub total: Money,
    pub redistributed: bool,
}

impl ResolvedSeries {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            months: [Decimal::ZERO; 12],
            total: Decimal::ZERO,
            redistributed: false,
        }
    }

    /// Recorded values as-is. Keys outside 1..=12 are ignored.
    pub fn raw(year: i32, entries_by_month: &BTreeMap<u32, Money>) -> Self {
        let mut series = Self::empty(year);
        for (&month, &value) in entries_by_month {
            if (1..=12).contains(&month) {
                series.months[month as usize - 1] += value;
                series.total += value;
            }
        }
        series
    }

    /// `total` spread evenly over `active_months`. With no active month
    /// nothing can be placed and both monthly and yearly values are zero.
    pub fn spread(year: i32, total: Money, active_months: &[u32]) -> Self {
        let mut series = Self::empty(year);
        series.redistributed = true;
        if active_months.is_empty() {
            return series;
        }
        let share = total / Decimal::from(active_months.len() as u64);
        for &month in active_months {
            series.months[month as usize - 1] = share;
        }
        series.total = total;
        series
    }

    /// Apply the single-populated-month rule to one series.
    pub fn resolve(year: i32, entries_by_month: &BTreeMap<u32, Money>, active_months: &[u32]) -> Self {
        if needs_redistribution(entries_by_month) {
            let total: Money = entries_by_month
                .iter()
                .filter(|(m, _)| (1..=12).contains(*m))
                .map(|(_, v)| *v)
                .sum();
            Self::spread(year, total, active_months)
        } else {
            Self::raw(year, entries_by_month)
        }
    }

    pub fn month(&self, month: u32) -> Money {
        if (1..=12).contains(&month) {
            self.months[month as usize - 1]
        } else {
            Decimal::ZERO
        }
    }

    pub fn sum_months(&self, months: impl IntoIterator<Item = u32>) -> Money {
        months.into_iter().map(|m| self.month(m)).sum()
    }

    pub fn accumulate(&mut self, other: &ResolvedSeries) {
        for (slot, value) in self.months.iter_mut().zip(other.months.iter()) {
            *slot += *value;
        }
        self.total += other.total;
        self.redistributed |= other.redistributed;
    }
}

/// Drop month keys outside 1..=12, reporting each once.
pub(crate) fn drop_invalid_months(
    entries_by_month: BTreeMap<u32, Money>,
    context: &str,
    warnings: &mut Vec<String>,
) -> BTreeMap<u32, Money> {
    entries_by_month
        .into_iter()
        .filter(|(month, _)| {
            let valid = (1..=12).contains(month);
            if !valid {
                tracing::warn!(month = *month, context, "skipping row with invalid month");
                push_warning(
                    warnings,
                    format!("{context}: skipped row with invalid month {month}"),
                );
            }
            valid
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn series(pairs: &[(u32, Money)]) -> BTreeMap<u32, Money> {
        pairs.iter().copied().collect()
    }

    fn all_months() -> Vec<u32> {
        (1..=12).collect()
    }

    #[test]
    fn test_detector_single_month() {
        assert!(needs_redistribution(&series(&[(4, dec!(12000))])));
    }

    #[test]
    fn test_detector_zero_and_many_months() {
        assert!(!needs_redistribution(&series(&[])));
        assert!(!needs_redistribution(&series(&[(1, dec!(0)), (2, dec!(0))])));
        assert!(!needs_redistribution(&series(&[(1, dec!(10)), (2, dec!(20))])));
    }

    #[test]
    fn test_detector_ignores_zero_months() {
        assert!(needs_redistribution(&series(&[(1, dec!(0)), (7, dec!(500))])));
    }

    #[test]
    fn test_spread_preserves_year_total() {
        let resolved = ResolvedSeries::resolve(2024, &series(&[(1, dec!(12000))]), &all_months());
        assert!(resolved.redistributed);
        assert_eq!(resolved.month(6), dec!(1000));
        assert_eq!(resolved.total, dec!(12000));
        assert_eq!(resolved.sum_months(1..=12), dec!(12000));
    }

    #[test]
    fn test_spread_only_over_active_months() {
        let active = vec![10, 11, 12];
        let resolved = ResolvedSeries::resolve(2024, &series(&[(2, dec!(900))]), &active);
        assert_eq!(resolved.month(2), Decimal::ZERO);
        assert_eq!(resolved.month(11), dec!(300));
        assert_eq!(resolved.total, dec!(900));
    }

    #[test]
    fn test_spread_without_active_months_is_zero() {
        let resolved = ResolvedSeries::resolve(2024, &series(&[(2, dec!(900))]), &[]);
        assert_eq!(resolved.total, Decimal::ZERO);
        assert_eq!(resolved.sum_months(1..=12), Decimal::ZERO);
    }

    #[test]
    fn test_dense_series_used_verbatim() {
        let resolved = ResolvedSeries::resolve(
            2024,
            &series(&[(1, dec!(100)), (3, dec!(300))]),
            &all_months(),
        );
        assert!(!resolved.redistributed);
        assert_eq!(resolved.month(1), dec!(100));
        assert_eq!(resolved.month(2), Decimal::ZERO);
        assert_eq!(resolved.total, dec!(400));
    }

    #[test]
    fn test_group_needs_every_pair_single_month() {
        let single = vec![series(&[(1, dec!(1200))]), series(&[(5, dec!(2400))])];
        assert!(group_needs_redistribution(&single));

        let mixed = vec![
            series(&[(1, dec!(1200))]),
            series(&[(2, dec!(100)), (3, dec!(100))]),
        ];
        assert!(!group_needs_redistribution(&mixed));
    }

    #[test]
    fn test_group_decision_ignores_empty_pairs() {
        let pairs = vec![series(&[(3, dec!(5))]), series(&[(4, dec!(0))]), series(&[])];
        assert!(group_needs_redistribution(&pairs));
        assert!(!group_needs_redistribution(&[series(&[]), series(&[])]));
        assert!(!group_needs_redistribution(&[]));
    }

    #[test]
    fn test_drop_invalid_months_reports_each_month() {
        let mut warnings = Vec::new();
        let cleaned = drop_invalid_months(
            series(&[(0, dec!(1)), (3, dec!(2)), (13, dec!(3))]),
            "external expenses 2024",
            &mut warnings,
        );
        assert_eq!(cleaned.len(), 1);
        assert_eq!(warnings.len(), 2);
    }
}
