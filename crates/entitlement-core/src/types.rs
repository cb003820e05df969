use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EntitlementError;
use crate::EntitlementResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Multipliers and percentages. Which of the two is documented on each field.
pub type Rate = Decimal;

/// Identifier of a project in the host ledger.
pub type ProjectId = String;

// ---------------------------------------------------------------------------
// MonthYear
// ---------------------------------------------------------------------------

/// A calendar month. Ordered chronologically; serialised as `MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    pub fn new(year: i32, month: u32) -> EntitlementResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EntitlementError::DateError(format!(
                "month {month} out of range 1..=12"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Months elapsed since January of year 0.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn add_months(&self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse the month-year spellings found in ledger exports:
    /// `MM/YYYY`, `M/YYYY`, `YYYY-MM`, `YYYY-MM-DD` and `DD/MM/YYYY`.
    pub fn parse(raw: &str) -> EntitlementResult<Self> {
        let s = raw.trim();
        let malformed = || EntitlementError::DateError(format!("unparsable month-year '{raw}'"));

        let parts: Vec<&str> = if s.contains('/') {
            s.split('/').collect()
        } else if s.contains('-') {
            s.split('-').collect()
        } else {
            return Err(malformed());
        };

        match (s.contains('/'), parts.len()) {
            (true, 2) => {
                let month: u32 = parts[0].trim().parse().map_err(|_| malformed())?;
                let year: i32 = parts[1].trim().parse().map_err(|_| malformed())?;
                Self::new(year, month).map_err(|_| malformed())
            }
            (true, 3) => NaiveDate::parse_from_str(s, "%d/%m/%Y")
                .map(Self::from_date)
                .map_err(|_| malformed()),
            (false, 2) => {
                let year: i32 = parts[0].trim().parse().map_err(|_| malformed())?;
                let month: u32 = parts[1].trim().parse().map_err(|_| malformed())?;
                Self::new(year, month).map_err(|_| malformed())
            }
            (false, 3) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Self::from_date)
                .map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl TryFrom<String> for MonthYear {
    type Error = EntitlementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Reporting period every allocation operation is parameterised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    /// A single calendar month
    Month { month: MonthYear },
    /// A whole calendar year
    Year { year: i32 },
    /// The project's entire window
    WholeProject,
    /// A closed range of months
    Window { start: MonthYear, end: MonthYear },
}

impl Period {
    pub fn month(year: i32, month: u32) -> EntitlementResult<Self> {
        Ok(Period::Month {
            month: MonthYear::new(year, month)?,
        })
    }

    pub fn year(year: i32) -> Self {
        Period::Year { year }
    }

    pub fn window(start: MonthYear, end: MonthYear) -> EntitlementResult<Self> {
        if start > end {
            return Err(EntitlementError::InvalidInput {
                field: "period".into(),
                reason: format!("window start {start} is after end {end}"),
            });
        }
        Ok(Period::Window { start, end })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month { month } => write!(f, "{month}"),
            Period::Year { year } => write!(f, "{year}"),
            Period::WholeProject => write!(f, "whole project"),
            Period::Window { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Record a warning once; repeated degradations of the same kind collapse.
pub(crate) fn push_warning(warnings: &mut Vec<String>, message: String) {
    if !warnings.contains(&message) {
        warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_month_year_spellings() {
        let expected = MonthYear::new(2024, 3).unwrap();
        assert_eq!(MonthYear::parse("03/2024").unwrap(), expected);
        assert_eq!(MonthYear::parse("3/2024").unwrap(), expected);
        assert_eq!(MonthYear::parse("2024-03").unwrap(), expected);
        assert_eq!(MonthYear::parse("2024-03-17").unwrap(), expected);
        assert_eq!(MonthYear::parse(" 17/03/2024 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(MonthYear::parse("13/2024").is_err());
        assert!(MonthYear::parse("2024").is_err());
        assert!(MonthYear::parse("march 2024").is_err());
        assert!(MonthYear::parse("2024-02-30").is_err());
        assert!(MonthYear::parse("").is_err());
    }

    #[test]
    fn test_ordinal_round_trip_across_year_boundary() {
        let dec_2024 = MonthYear::new(2024, 12).unwrap();
        assert_eq!(dec_2024.next(), MonthYear::new(2025, 1).unwrap());
        assert_eq!(dec_2024.add_months(-12), MonthYear::new(2023, 12).unwrap());
        assert_eq!(MonthYear::from_ordinal(dec_2024.ordinal()), dec_2024);
    }

    #[test]
    fn test_month_year_serde_as_string() {
        let m = MonthYear::new(2025, 7).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"07/2025\"");
        let back: MonthYear = serde_json::from_str("\"2025-07\"").unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_period_window_rejects_inverted_range() {
        let start = MonthYear::new(2024, 6).unwrap();
        let end = MonthYear::new(2024, 1).unwrap();
        assert!(Period::window(start, end).is_err());
        assert!(Period::window(end, start).is_ok());
    }
}
