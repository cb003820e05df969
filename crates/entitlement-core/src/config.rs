//! Entitlement configuration: subsidy rules, tax-credit coefficients and
//! engine-wide options.
//!
//! Every field carries a documented default; configurations are validated
//! by the engine before any computation uses them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthWindow;
use crate::error::EntitlementError;
use crate::types::{Money, MonthYear, Rate};
use crate::EntitlementResult;

// ---------------------------------------------------------------------------
// Cost basis
// ---------------------------------------------------------------------------

/// Which daily rate of a labor category prices a day of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Salary plus employer charges
    #[default]
    Charged,
    /// Production cost rate
    Production,
    /// Fully loaded cost rate
    Complete,
}

/// Daily rates of one labor category for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRate {
    pub charged_rate: Money,
    pub production_rate: Money,
    pub complete_rate: Money,
}

impl CategoryRate {
    pub fn rate_for(&self, basis: CostBasis) -> Money {
        match basis {
            CostBasis::Charged => self.charged_rate,
            CostBasis::Production => self.production_rate,
            CostBasis::Complete => self.complete_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// Subsidy configuration
// ---------------------------------------------------------------------------

/// Inclusion flag and weight of one cost dimension in an eligible base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRule {
    #[serde(default)]
    pub included: bool,
    #[serde(default = "default_coefficient")]
    pub coefficient: Rate,
}

fn default_coefficient() -> Rate {
    Decimal::ONE
}

impl Default for DimensionRule {
    fn default() -> Self {
        Self {
            included: false,
            coefficient: Decimal::ONE,
        }
    }
}

impl DimensionRule {
    pub fn included(coefficient: Rate) -> Self {
        Self {
            included: true,
            coefficient,
        }
    }

    pub fn excluded() -> Self {
        Self::default()
    }
}

/// How a subsidy's total entitlement is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubsidyMode {
    /// Fixed grant amount, allocated in proportion to elapsed months
    Flat { amount: Money },
    /// Percentage of the eligible base, allocated in proportion to expenses
    Detailed {
        /// Percentage (50 = 50 %)
        rate_percent: Rate,
    },
}

/// One subsidy attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyConfig {
    /// Display name of the grant
    pub name: String,
    pub mode: SubsidyMode,
    #[serde(default)]
    pub labor: DimensionRule,
    #[serde(default)]
    pub external: DimensionRule,
    #[serde(default)]
    pub other: DimensionRule,
    #[serde(default)]
    pub amortization: DimensionRule,
    /// Extra multiplier applied to labor only (`cd`)
    #[serde(default = "default_coefficient")]
    pub charge_coefficient: Rate,
    /// Daily rate used to price labor days
    #[serde(default)]
    pub cost_basis: CostBasis,
    /// First eligible month; defaults to the project's start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_start: Option<MonthYear>,
    /// Last eligible month; defaults to the project's end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_end: Option<MonthYear>,
    /// Ceiling applied to the eligible base before the rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_eligible_base: Option<Money>,
    /// Ceiling applied to the final entitlement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Money>,
}

impl SubsidyConfig {
    /// A flat grant with every dimension excluded.
    pub fn flat(name: impl Into<String>, amount: Money) -> Self {
        Self::with_mode(name, SubsidyMode::Flat { amount })
    }

    /// A rate-based grant with every dimension excluded.
    pub fn detailed(name: impl Into<String>, rate_percent: Rate) -> Self {
        Self::with_mode(name, SubsidyMode::Detailed { rate_percent })
    }

    fn with_mode(name: impl Into<String>, mode: SubsidyMode) -> Self {
        Self {
            name: name.into(),
            mode,
            labor: DimensionRule::default(),
            external: DimensionRule::default(),
            other: DimensionRule::default(),
            amortization: DimensionRule::default(),
            charge_coefficient: Decimal::ONE,
            cost_basis: CostBasis::default(),
            validity_start: None,
            validity_end: None,
            max_eligible_base: None,
            max_amount: None,
        }
    }

    pub fn with_labor(mut self, rule: DimensionRule, charge_coefficient: Rate) -> Self {
        self.labor = rule;
        self.charge_coefficient = charge_coefficient;
        self
    }

    pub fn with_external(mut self, rule: DimensionRule) -> Self {
        self.external = rule;
        self
    }

    pub fn with_other(mut self, rule: DimensionRule) -> Self {
        self.other = rule;
        self
    }

    pub fn with_amortization(mut self, rule: DimensionRule) -> Self {
        self.amortization = rule;
        self
    }

    pub fn with_validity(mut self, start: MonthYear, end: MonthYear) -> Self {
        self.validity_start = Some(start);
        self.validity_end = Some(end);
        self
    }

    pub fn with_caps(mut self, max_eligible_base: Option<Money>, max_amount: Option<Money>) -> Self {
        self.max_eligible_base = max_eligible_base;
        self.max_amount = max_amount;
        self
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.mode, SubsidyMode::Flat { .. })
    }

    /// Validity window, falling back to the project's dates per bound.
    pub fn validity_window(&self, project: &MonthWindow) -> EntitlementResult<MonthWindow> {
        let start = self.validity_start.unwrap_or(project.start);
        let end = self.validity_end.unwrap_or(project.end);
        MonthWindow::new(start, end).map_err(|_| EntitlementError::InvalidInput {
            field: "validity_start".into(),
            reason: format!(
                "subsidy '{}' validity starts {start} after it ends {end}",
                self.name
            ),
        })
    }

    pub fn validate(&self) -> EntitlementResult<()> {
        match self.mode {
            SubsidyMode::Flat { amount } => {
                if amount < Decimal::ZERO {
                    return Err(invalid("mode.amount", "Flat amount must be non-negative"));
                }
            }
            SubsidyMode::Detailed { rate_percent } => {
                if rate_percent < Decimal::ZERO || rate_percent > dec!(100) {
                    return Err(invalid(
                        "mode.rate_percent",
                        "Rate must be between 0 and 100 percent",
                    ));
                }
            }
        }

        for (field, rule) in [
            ("labor.coefficient", &self.labor),
            ("external.coefficient", &self.external),
            ("other.coefficient", &self.other),
            ("amortization.coefficient", &self.amortization),
        ] {
            if rule.coefficient < Decimal::ZERO {
                return Err(invalid(field, "Coefficient must be non-negative"));
            }
        }
        if self.charge_coefficient < Decimal::ZERO {
            return Err(invalid(
                "charge_coefficient",
                "Charge coefficient must be non-negative",
            ));
        }

        if let Some(cap) = self.max_eligible_base {
            if cap < Decimal::ZERO {
                return Err(invalid("max_eligible_base", "Cap must be non-negative"));
            }
        }
        if let Some(cap) = self.max_amount {
            if cap < Decimal::ZERO {
                return Err(invalid("max_amount", "Cap must be non-negative"));
            }
        }

        if let (Some(start), Some(end)) = (self.validity_start, self.validity_end) {
            if start > end {
                return Err(invalid(
                    "validity_start",
                    "Validity start must not be after validity end",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> EntitlementError {
    EntitlementError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Tax credit
// ---------------------------------------------------------------------------

/// Statutory tax-credit coefficients for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCreditCoefficients {
    pub year: i32,
    /// Multiplier on labor cost
    pub k1: Rate,
    /// Multiplier on amortization
    pub k2: Rate,
    /// Credit rate applied to the final base
    pub k3: Rate,
}

/// What to do when no coefficients exist for the requested year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientFallback {
    /// Borrow the closest available year, earlier years winning ties
    #[default]
    Nearest,
    /// Credit is zero for a year without coefficients
    Disabled,
}

impl CoefficientFallback {
    /// Pick the substitute for `year` among the available coefficient sets.
    pub fn pick(
        &self,
        year: i32,
        available: &[TaxCreditCoefficients],
    ) -> Option<TaxCreditCoefficients> {
        match self {
            CoefficientFallback::Disabled => None,
            CoefficientFallback::Nearest => available
                .iter()
                .min_by_key(|c| ((c.year - year).abs(), c.year > year))
                .copied(),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Engine-wide knobs that are not part of any stored configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Daily rate used to price labor for the tax credit
    #[serde(default)]
    pub tax_credit_cost_basis: CostBasis,
    #[serde(default)]
    pub coefficient_fallback: CoefficientFallback,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn my(year: i32, month: u32) -> MonthYear {
        MonthYear::new(year, month).unwrap()
    }

    #[test]
    fn test_validity_defaults_to_project_window() {
        let project = MonthWindow::new(my(2024, 1), my(2025, 6)).unwrap();
        let cfg = SubsidyConfig::flat("grant", dec!(1000));
        assert_eq!(cfg.validity_window(&project).unwrap(), project);

        let mut partial = cfg.clone();
        partial.validity_end = Some(my(2024, 12));
        let w = partial.validity_window(&project).unwrap();
        assert_eq!(w.start, my(2024, 1));
        assert_eq!(w.end, my(2024, 12));
    }

    #[test]
    fn test_validate_rejects_out_of_range_rate() {
        assert!(SubsidyConfig::detailed("g", dec!(120)).validate().is_err());
        assert!(SubsidyConfig::detailed("g", dec!(-1)).validate().is_err());
        assert!(SubsidyConfig::detailed("g", dec!(45)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_caps_and_coefficients() {
        let cfg = SubsidyConfig::detailed("g", dec!(50)).with_caps(Some(dec!(-1)), None);
        assert!(cfg.validate().is_err());

        let cfg = SubsidyConfig::detailed("g", dec!(50))
            .with_external(DimensionRule::included(dec!(-0.5)));
        assert!(cfg.validate().is_err());

        let cfg = SubsidyConfig::flat("g", dec!(-10));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_validity() {
        let cfg = SubsidyConfig::flat("g", dec!(10)).with_validity(my(2024, 6), my(2024, 1));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_subsidy_config_deserialises_with_defaults() {
        let json = r#"{
            "name": "Regional innovation grant",
            "mode": { "kind": "detailed", "rate_percent": "45" },
            "external": { "included": true },
            "validity_start": "01/2024"
        }"#;
        let cfg: SubsidyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.external, DimensionRule::included(Decimal::ONE));
        assert_eq!(cfg.labor, DimensionRule::excluded());
        assert_eq!(cfg.charge_coefficient, Decimal::ONE);
        assert_eq!(cfg.cost_basis, CostBasis::Charged);
        assert_eq!(cfg.validity_start, Some(my(2024, 1)));
        assert!(cfg.validity_end.is_none());
    }

    #[test]
    fn test_nearest_fallback_prefers_earlier_year_on_tie() {
        let available = [
            TaxCreditCoefficients { year: 2022, k1: dec!(1), k2: dec!(1), k3: dec!(0.3) },
            TaxCreditCoefficients { year: 2024, k1: dec!(1), k2: dec!(1), k3: dec!(0.2) },
        ];
        let picked = CoefficientFallback::Nearest.pick(2023, &available).unwrap();
        assert_eq!(picked.year, 2022);
        let picked = CoefficientFallback::Nearest.pick(2030, &available).unwrap();
        assert_eq!(picked.year, 2024);
        assert!(CoefficientFallback::Disabled.pick(2023, &available).is_none());
    }

    #[test]
    fn test_category_rate_by_basis() {
        let rate = CategoryRate {
            charged_rate: dec!(400),
            production_rate: dec!(550),
            complete_rate: dec!(700),
        };
        assert_eq!(rate.rate_for(CostBasis::Charged), dec!(400));
        assert_eq!(rate.rate_for(CostBasis::Production), dec!(550));
        assert_eq!(rate.rate_for(CostBasis::Complete), dec!(700));
    }
}
