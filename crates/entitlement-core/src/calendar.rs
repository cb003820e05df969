//! Month windows and the active-month calendar.
//!
//! Project windows and subsidy validity windows are both closed ranges of
//! calendar months; everything downstream reasons about them through
//! [`MonthWindow`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EntitlementError;
use crate::types::{MonthYear, Period};
use crate::EntitlementResult;

/// A closed, non-empty range of calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: MonthYear,
    pub end: MonthYear,
}

impl MonthWindow {
    pub fn new(start: MonthYear, end: MonthYear) -> EntitlementResult<Self> {
        if start > end {
            return Err(EntitlementError::InvalidInput {
                field: "window".into(),
                reason: format!("start {start} is after end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, month: MonthYear) -> bool {
        self.start <= month && month <= self.end
    }

    /// Number of months in the window, both ends included.
    pub fn month_count(&self) -> u32 {
        (self.end.ordinal() - self.start.ordinal() + 1) as u32
    }

    pub fn intersect(&self, other: &MonthWindow) -> Option<MonthWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(MonthWindow { start, end })
    }

    /// Every month of the window in chronological order.
    pub fn months(&self) -> impl Iterator<Item = MonthYear> {
        let first = self.start.ordinal();
        (first..=self.end.ordinal()).map(MonthYear::from_ordinal)
    }

    /// Calendar years touched by the window.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }

    /// Months of the window grouped by calendar year.
    pub fn months_by_year(&self) -> BTreeMap<i32, Vec<u32>> {
        let mut grouped: BTreeMap<i32, Vec<u32>> = BTreeMap::new();
        for m in self.months() {
            grouped.entry(m.year()).or_default().push(m.month());
        }
        grouped
    }

    pub fn active_months(&self, year: i32) -> Vec<u32> {
        active_months(self.start, self.end, year)
    }

    /// The window covering a whole calendar year.
    pub fn calendar_year(year: i32) -> Self {
        Self {
            start: MonthYear::from_ordinal(year as i64 * 12),
            end: MonthYear::from_ordinal(year as i64 * 12 + 11),
        }
    }

    /// Resolve a period against the project window it is asked about.
    pub fn for_period(period: &Period, project: &MonthWindow) -> MonthWindow {
        match *period {
            Period::Month { month } => MonthWindow {
                start: month,
                end: month,
            },
            Period::Year { year } => MonthWindow::calendar_year(year),
            Period::WholeProject => *project,
            Period::Window { start, end } => MonthWindow {
                start: start.min(end),
                end: start.max(end),
            },
        }
    }
}

/// Months (1..=12) of `year` that fall inside `[start, end]`, ascending.
///
/// Empty when the year lies entirely outside the interval.
pub fn active_months(start: MonthYear, end: MonthYear, year: i32) -> Vec<u32> {
    if start > end {
        return Vec::new();
    }
    let year_first = year as i64 * 12;
    let year_last = year_first + 11;
    let lo = start.ordinal().max(year_first);
    let hi = end.ordinal().min(year_last);
    if lo > hi {
        return Vec::new();
    }
    (lo..=hi).map(|o| (o - year_first) as u32 + 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn my(year: i32, month: u32) -> MonthYear {
        MonthYear::new(year, month).unwrap()
    }

    #[test]
    fn test_active_months_full_year() {
        let months = active_months(my(2024, 1), my(2024, 12), 2024);
        assert_eq!(months, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_active_months_partial_years() {
        let start = my(2023, 10);
        let end = my(2025, 3);
        assert_eq!(active_months(start, end, 2023), vec![10, 11, 12]);
        assert_eq!(active_months(start, end, 2024).len(), 12);
        assert_eq!(active_months(start, end, 2025), vec![1, 2, 3]);
    }

    #[test]
    fn test_active_months_outside_interval() {
        let start = my(2024, 4);
        let end = my(2024, 9);
        assert!(active_months(start, end, 2023).is_empty());
        assert!(active_months(start, end, 2025).is_empty());
    }

    #[test]
    fn test_active_months_single_month() {
        assert_eq!(active_months(my(2024, 7), my(2024, 7), 2024), vec![7]);
    }

    #[test]
    fn test_window_intersection_and_count() {
        let project = MonthWindow::new(my(2024, 1), my(2025, 12)).unwrap();
        let validity = MonthWindow::new(my(2023, 6), my(2024, 6)).unwrap();
        let overlap = project.intersect(&validity).unwrap();
        assert_eq!(overlap.start, my(2024, 1));
        assert_eq!(overlap.end, my(2024, 6));
        assert_eq!(overlap.month_count(), 6);
        assert!(overlap.contains(my(2024, 6)));
        assert!(!overlap.contains(my(2024, 7)));

        let disjoint = MonthWindow::new(my(2026, 1), my(2026, 2)).unwrap();
        assert!(project.intersect(&disjoint).is_none());
    }

    #[test]
    fn test_window_months_cross_year() {
        let w = MonthWindow::new(my(2024, 11), my(2025, 2)).unwrap();
        let months: Vec<MonthYear> = w.months().collect();
        assert_eq!(
            months,
            vec![my(2024, 11), my(2024, 12), my(2025, 1), my(2025, 2)]
        );
        assert_eq!(w.years().collect::<Vec<i32>>(), vec![2024, 2025]);
        let grouped = w.months_by_year();
        assert_eq!(grouped[&2024], vec![11, 12]);
        assert_eq!(grouped[&2025], vec![1, 2]);
    }

    #[test]
    fn test_for_period_whole_project_uses_project_window() {
        let project = MonthWindow::new(my(2024, 3), my(2026, 8)).unwrap();
        assert_eq!(MonthWindow::for_period(&Period::WholeProject, &project), project);
        let year = MonthWindow::for_period(&Period::year(2025), &project);
        assert_eq!(year.month_count(), 12);
    }
}
