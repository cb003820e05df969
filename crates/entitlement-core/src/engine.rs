//! Entry points over a [`LedgerReader`].
//!
//! Each operation reads what it needs from the ledger, resolves the cost
//! picture for the years involved and returns a [`ComputationOutput`]
//! envelope. The rate memo is the only state carried between calls.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use serde_json::json;
use tracing::instrument;

use crate::amortization::{schedules_from_records, AmortizationSchedule};
use crate::calendar::MonthWindow;
use crate::config::{CostBasis, EngineOptions, SubsidyConfig};
use crate::costs::{CostBook, CostPicture};
use crate::eligible_base::{eligible_base, EligibleBaseBreakdown};
use crate::error::EntitlementError;
use crate::ledger::LedgerReader;
use crate::rates::RateCache;
use crate::subsidy::{self, SubsidyAllocation, SubsidySchedule};
use crate::types::{push_warning, with_metadata, ComputationOutput, Period};
use crate::EntitlementResult;

#[cfg(feature = "tax_credit")]
use crate::tax_credit::{
    compute_year, resolve_coefficients, SubsidyDeduction, TaxCreditBreakdown, TaxCreditSummary,
};

/// Project window plus the amortization schedules derived from it.
struct ProjectContext {
    project: MonthWindow,
    schedules: Vec<AmortizationSchedule>,
}

/// Allocation engine bound to one ledger.
pub struct EntitlementEngine<'a, L: LedgerReader + ?Sized> {
    ledger: &'a L,
    options: EngineOptions,
    rates: RefCell<RateCache>,
}

impl<'a, L: LedgerReader + ?Sized> EntitlementEngine<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            options: EngineOptions::default(),
            rates: RefCell::new(RateCache::new()),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Reuse a rate memo from an earlier engine.
    pub fn with_rate_cache(mut self, rates: RateCache) -> Self {
        self.rates = RefCell::new(rates);
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Drop memoised category rates, e.g. after the rate table was edited.
    pub fn invalidate_rate_cache(&self) {
        self.rates.borrow_mut().invalidate();
    }

    pub fn into_rate_cache(self) -> RateCache {
        self.rates.into_inner()
    }

    // -----------------------------------------------------------------------
    // Output contract
    // -----------------------------------------------------------------------

    /// Eligible base of `config` over `period`.
    #[instrument(skip_all, fields(project_id = %project_id, subsidy = %config.name, period = %period))]
    pub fn compute_eligible_base(
        &self,
        project_id: &str,
        config: &SubsidyConfig,
        period: &Period,
    ) -> EntitlementResult<ComputationOutput<EligibleBaseBreakdown>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        config.validate()?;
        let ctx = self.project_context(project_id, &mut warnings)?;
        let window = MonthWindow::for_period(period, &ctx.project);
        let years = years_covering(&[ctx.project, window]);
        let costs = self.load_costs(project_id, &ctx, &years, config.cost_basis, &mut warnings)?;

        let result = eligible_base(&costs, config, period);
        tracing::debug!(total = %result.total, "eligible base computed");

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Eligible base: included dimensions weighted by their coefficients over redistributed monthly costs",
            &json!({
                "project_id": project_id,
                "subsidy": config.name,
                "cost_basis": config.cost_basis,
                "period": period,
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// Part of `config`'s total entitlement attributed to `period`.
    #[instrument(skip_all, fields(project_id = %project_id, subsidy = %config.name, period = %period))]
    pub fn compute_subsidy_amount(
        &self,
        project_id: &str,
        config: &SubsidyConfig,
        period: &Period,
    ) -> EntitlementResult<ComputationOutput<SubsidyAllocation>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        config.validate()?;
        let ctx = self.project_context(project_id, &mut warnings)?;
        let validity = config.validity_window(&ctx.project)?;
        check_validity(&config.name, &validity, &ctx.project, &mut warnings);

        let window = MonthWindow::for_period(period, &ctx.project);
        let years = years_covering(&[ctx.project, validity, window]);
        let costs = self.load_costs(project_id, &ctx, &years, config.cost_basis, &mut warnings)?;

        let plan = subsidy::plan(config, &costs, &ctx.project)?;
        let result = subsidy::allocate(&plan, config, &costs, period);
        tracing::debug!(
            total = %plan.total_entitlement,
            amount = %result.amount,
            "subsidy allocated"
        );

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            subsidy_methodology(config),
            &json!({
                "project_id": project_id,
                "subsidy": config.name,
                "validity": validity,
                "max_eligible_base": config.max_eligible_base,
                "max_amount": config.max_amount,
                "period": period,
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// Tax credit of one project over `period`.
    #[cfg(feature = "tax_credit")]
    #[instrument(skip_all, fields(project_id = %project_id, period = %period))]
    pub fn compute_tax_credit(
        &self,
        project_id: &str,
        period: &Period,
    ) -> EntitlementResult<ComputationOutput<TaxCreditBreakdown>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        let result = self.tax_credit_breakdown(project_id, period, &mut warnings)?;
        tracing::debug!(base = %result.base, credit = %result.credit, "tax credit computed");

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "R&D tax credit: (labor x k1 + amortization x k2 - subsidies) x k3 per project-year, floored at zero",
            &json!({
                "project_id": project_id,
                "period": period,
                "options": self.options,
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    // -----------------------------------------------------------------------
    // Supplementary operations
    // -----------------------------------------------------------------------

    /// Tax credit summed over several projects.
    #[cfg(feature = "tax_credit")]
    #[instrument(skip_all, fields(projects = project_ids.len(), period = %period))]
    pub fn compute_tax_credit_for_projects<S: AsRef<str>>(
        &self,
        project_ids: &[S],
        period: &Period,
    ) -> EntitlementResult<ComputationOutput<TaxCreditSummary>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        let mut projects = Vec::with_capacity(project_ids.len());
        for id in project_ids {
            projects.push(self.tax_credit_breakdown(id.as_ref(), period, &mut warnings)?);
        }
        let result = TaxCreditSummary::from_projects(*period, projects);

        let elapsed = start.elapsed().as_micros() as u64;
        let ids: Vec<&str> = project_ids.iter().map(|id| id.as_ref()).collect();
        Ok(with_metadata(
            "R&D tax credit per project, bases and credits summed independently",
            &json!({
                "project_ids": ids,
                "period": period,
                "options": self.options,
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// Month-by-month allocation of `config` over its validity window.
    #[instrument(skip_all, fields(project_id = %project_id, subsidy = %config.name))]
    pub fn subsidy_schedule(
        &self,
        project_id: &str,
        config: &SubsidyConfig,
    ) -> EntitlementResult<ComputationOutput<SubsidySchedule>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        config.validate()?;
        let ctx = self.project_context(project_id, &mut warnings)?;
        let validity = config.validity_window(&ctx.project)?;
        check_validity(&config.name, &validity, &ctx.project, &mut warnings);

        let years = years_covering(&[ctx.project, validity]);
        let costs = self.load_costs(project_id, &ctx, &years, config.cost_basis, &mut warnings)?;
        let plan = subsidy::plan(config, &costs, &ctx.project)?;
        let result = subsidy::schedule(&plan, config, &costs);

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            subsidy_methodology(config),
            &json!({
                "project_id": project_id,
                "subsidy": config.name,
                "validity": validity,
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// Allocation of every subsidy stored for the project.
    ///
    /// Stored configurations that fail validation are skipped with a warning.
    #[instrument(skip_all, fields(project_id = %project_id, period = %period))]
    pub fn project_subsidies(
        &self,
        project_id: &str,
        period: &Period,
    ) -> EntitlementResult<ComputationOutput<Vec<SubsidyAllocation>>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        let ctx = self.project_context(project_id, &mut warnings)?;
        let subsidies = self.stored_subsidies(project_id, &ctx, &mut warnings)?;

        let mut windows = vec![ctx.project, MonthWindow::for_period(period, &ctx.project)];
        windows.extend(subsidies.iter().map(|(_, validity)| *validity));
        let years = years_covering(&windows);
        let books = self.load_books(
            project_id,
            &ctx,
            &years,
            subsidies.iter().map(|(c, _)| c.cost_basis),
            &mut warnings,
        )?;

        let mut result = Vec::with_capacity(subsidies.len());
        for (config, _) in &subsidies {
            let Some(costs) = books.get(&config.cost_basis) else {
                continue;
            };
            let plan = subsidy::plan(config, costs, &ctx.project)?;
            result.push(subsidy::allocate(&plan, config, costs, period));
        }

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Allocation of every stored subsidy of the project",
            &json!({
                "project_id": project_id,
                "period": period,
                "subsidies": subsidies.iter().map(|(c, _)| c.name.as_str()).collect::<Vec<_>>(),
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// Reconstructed monthly costs of one project-year.
    #[instrument(skip_all, fields(project_id = %project_id, year = year))]
    pub fn cost_picture(
        &self,
        project_id: &str,
        year: i32,
        basis: CostBasis,
    ) -> EntitlementResult<ComputationOutput<CostPicture>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        let ctx = self.project_context(project_id, &mut warnings)?;
        if !ctx.project.years().contains(&year) {
            push_warning(
                &mut warnings,
                format!(
                    "{year} lies outside the project window {}..{}",
                    ctx.project.start, ctx.project.end
                ),
            );
        }
        let years: BTreeSet<i32> = BTreeSet::from([year]);
        let costs = self.load_costs(project_id, &ctx, &years, basis, &mut warnings)?;
        let result = match costs.year(year) {
            Some(y) => CostPicture::from_year(project_id, basis, y),
            None => CostPicture::from_year(project_id, basis, &crate::costs::YearCosts::empty(year)),
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Monthly cost picture with single-month totals spread over active months",
            &json!({
                "project_id": project_id,
                "year": year,
                "cost_basis": basis,
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// Amortization schedules of every usable investment of the project.
    #[instrument(skip_all, fields(project_id = %project_id))]
    pub fn amortization_schedules(
        &self,
        project_id: &str,
    ) -> EntitlementResult<ComputationOutput<Vec<AmortizationSchedule>>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        let ctx = self.project_context(project_id, &mut warnings)?;

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Straight-line amortization from the month after purchase, truncated at project end",
            &json!({
                "project_id": project_id,
                "project_end": ctx.project.end,
            }),
            warnings,
            elapsed,
            ctx.schedules,
        ))
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    fn project_context(
        &self,
        project_id: &str,
        warnings: &mut Vec<String>,
    ) -> EntitlementResult<ProjectContext> {
        let project = self.ledger.project_window(project_id)?;
        if project.start > project.end {
            return Err(EntitlementError::InvalidInput {
                field: "project_window".into(),
                reason: format!(
                    "project '{project_id}' starts {} after it ends {}",
                    project.start, project.end
                ),
            });
        }
        let records = self.ledger.investments(project_id)?;
        let schedules = schedules_from_records(&records, project.end, warnings);
        Ok(ProjectContext { project, schedules })
    }

    fn load_costs(
        &self,
        project_id: &str,
        ctx: &ProjectContext,
        years: &BTreeSet<i32>,
        basis: CostBasis,
        warnings: &mut Vec<String>,
    ) -> EntitlementResult<CostBook> {
        tracing::debug!(project_id, ?basis, years = years.len(), "loading costs");
        let mut rates = self.rates.borrow_mut();
        CostBook::load(
            self.ledger,
            &mut rates,
            project_id,
            ctx.project,
            years.iter().copied(),
            basis,
            &ctx.schedules,
            warnings,
        )
    }

    /// One cost book per distinct basis.
    fn load_books(
        &self,
        project_id: &str,
        ctx: &ProjectContext,
        years: &BTreeSet<i32>,
        bases: impl IntoIterator<Item = CostBasis>,
        warnings: &mut Vec<String>,
    ) -> EntitlementResult<HashMap<CostBasis, CostBook>> {
        let mut books = HashMap::new();
        for basis in bases {
            if books.contains_key(&basis) {
                continue;
            }
            let book = self.load_costs(project_id, ctx, years, basis, warnings)?;
            books.insert(basis, book);
        }
        Ok(books)
    }

    /// Stored subsidy configurations that pass validation, with their
    /// resolved validity windows.
    fn stored_subsidies(
        &self,
        project_id: &str,
        ctx: &ProjectContext,
        warnings: &mut Vec<String>,
    ) -> EntitlementResult<Vec<(SubsidyConfig, MonthWindow)>> {
        let mut valid = Vec::new();
        for config in self.ledger.subsidy_configs(project_id)? {
            let validity = match config.validate().and_then(|_| config.validity_window(&ctx.project)) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(subsidy = %config.name, error = %e, "skipping stored subsidy");
                    push_warning(warnings, format!("Subsidy '{}' skipped: {e}", config.name));
                    continue;
                }
            };
            check_validity(&config.name, &validity, &ctx.project, warnings);
            valid.push((config, validity));
        }
        Ok(valid)
    }

    #[cfg(feature = "tax_credit")]
    fn tax_credit_breakdown(
        &self,
        project_id: &str,
        period: &Period,
        warnings: &mut Vec<String>,
    ) -> EntitlementResult<TaxCreditBreakdown> {
        let ctx = self.project_context(project_id, warnings)?;
        let subsidies = self.stored_subsidies(project_id, &ctx, warnings)?;

        let window = MonthWindow::for_period(period, &ctx.project);
        let mut windows = vec![ctx.project, window];
        windows.extend(subsidies.iter().map(|(_, validity)| *validity));
        let years = years_covering(&windows);

        let basis = self.options.tax_credit_cost_basis;
        let books = self.load_books(
            project_id,
            &ctx,
            &years,
            std::iter::once(basis).chain(subsidies.iter().map(|(c, _)| c.cost_basis)),
            warnings,
        )?;
        let Some(costs) = books.get(&basis) else {
            return Ok(TaxCreditBreakdown::from_years(project_id, *period, Vec::new()));
        };

        let mut plans = Vec::with_capacity(subsidies.len());
        for (config, _) in &subsidies {
            if let Some(book) = books.get(&config.cost_basis) {
                plans.push((subsidy::plan(config, book, &ctx.project)?, config, book));
            }
        }
        let deductions: Vec<SubsidyDeduction<'_>> = plans
            .iter()
            .map(|(plan, config, book)| SubsidyDeduction { plan, config, costs: book })
            .collect();

        let Some(active) = window.intersect(&ctx.project) else {
            push_warning(
                warnings,
                format!("Period {period} does not overlap project '{project_id}'"),
            );
            return Ok(TaxCreditBreakdown::from_years(project_id, *period, Vec::new()));
        };

        let mut years_out = Vec::new();
        for (year, months) in active.months_by_year() {
            let coefficients =
                resolve_coefficients(self.ledger, year, self.options.coefficient_fallback, warnings)?;
            years_out.push(compute_year(year, &months, costs, &deductions, coefficients));
        }
        Ok(TaxCreditBreakdown::from_years(project_id, *period, years_out))
    }
}

fn years_covering(windows: &[MonthWindow]) -> BTreeSet<i32> {
    windows.iter().flat_map(|w| w.years()).collect()
}

fn check_validity(
    subsidy: &str,
    validity: &MonthWindow,
    project: &MonthWindow,
    warnings: &mut Vec<String>,
) {
    if validity.intersect(project) != Some(*validity) {
        push_warning(
            warnings,
            format!(
                "Subsidy '{subsidy}' validity {}..{} extends beyond the project window {}..{}",
                validity.start, validity.end, project.start, project.end
            ),
        );
    }
}

fn subsidy_methodology(config: &SubsidyConfig) -> &'static str {
    if config.is_flat() {
        "Flat subsidy allocated pro rata of elapsed validity months"
    } else {
        "Detailed subsidy: base cap, then rate, then amount cap; allocated pro rata of the eligible base"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRate, DimensionRule};
    use crate::ledger::{ExpenseKind, InMemoryLedger, LaborEntry};
    use crate::types::MonthYear;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn my(year: i32, month: u32) -> MonthYear {
        MonthYear::new(year, month).unwrap()
    }

    fn ledger() -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new();
        ledger.add_project("P", my(2024, 1), my(2024, 12));
        ledger.add_category_rate(
            "engineer",
            2024,
            CategoryRate {
                charged_rate: dec!(400),
                production_rate: dec!(450),
                complete_rate: dec!(500),
            },
        );
        ledger
            .add_labor(
                "P",
                2024,
                LaborEntry {
                    member_id: "alice".into(),
                    category: "engineer".into(),
                    month: 3,
                    days: dec!(12),
                },
            )
            .unwrap();
        ledger
            .add_expense("P", ExpenseKind::External, 2024, 5, dec!(2400))
            .unwrap();
        ledger
    }

    #[test]
    fn test_rate_cache_survives_calls() {
        let ledger = ledger();
        let engine = EntitlementEngine::new(&ledger);
        let config = SubsidyConfig::detailed("g", dec!(50))
            .with_labor(DimensionRule::included(Decimal::ONE), Decimal::ONE);

        let first = engine
            .compute_eligible_base("P", &config, &Period::year(2024))
            .unwrap();
        let second = engine
            .compute_eligible_base("P", &config, &Period::year(2024))
            .unwrap();
        assert_eq!(first.result.total, dec!(4800));
        assert_eq!(first.result, second.result);

        let cache = engine.into_rate_cache();
        assert_eq!(cache.stats(), (1, 1));

        let engine = EntitlementEngine::new(&ledger).with_rate_cache(cache);
        engine
            .compute_eligible_base("P", &config, &Period::WholeProject)
            .unwrap();
        assert_eq!(engine.into_rate_cache().stats(), (2, 1));
    }

    #[test]
    fn test_invalidation_recomputes_identically() {
        let ledger = ledger();
        let engine = EntitlementEngine::new(&ledger);
        let config = SubsidyConfig::detailed("g", dec!(50))
            .with_labor(DimensionRule::included(Decimal::ONE), Decimal::ONE);
        let june = Period::month(2024, 6).unwrap();

        let before = engine.compute_eligible_base("P", &config, &june).unwrap();
        engine.invalidate_rate_cache();
        let after = engine.compute_eligible_base("P", &config, &june).unwrap();
        assert_eq!(before.result, after.result);
        assert_eq!(engine.into_rate_cache().generation(), 1);
    }

    #[test]
    fn test_inverted_project_window_is_rejected() {
        let mut ledger = InMemoryLedger::new();
        ledger.add_project("P", my(2024, 6), my(2024, 1));
        let engine = EntitlementEngine::new(&ledger);
        let err = engine.amortization_schedules("P").unwrap_err();
        assert!(matches!(err, EntitlementError::InvalidInput { .. }));
    }

    /// Reader whose expense ledger is unreachable.
    struct OfflineExpenses(InMemoryLedger);

    impl LedgerReader for OfflineExpenses {
        fn project_window(&self, project_id: &str) -> EntitlementResult<MonthWindow> {
            self.0.project_window(project_id)
        }

        fn labor_entries(&self, project_id: &str, year: i32) -> EntitlementResult<Vec<LaborEntry>> {
            self.0.labor_entries(project_id, year)
        }

        fn category_rate(&self, category: &str, year: i32) -> EntitlementResult<Option<CategoryRate>> {
            self.0.category_rate(category, year)
        }

        fn expenses(
            &self,
            _project_id: &str,
            _year: i32,
            _kind: ExpenseKind,
        ) -> EntitlementResult<std::collections::BTreeMap<u32, crate::types::Money>> {
            Err(EntitlementError::Ledger("expense store offline".into()))
        }

        fn investments(&self, project_id: &str) -> EntitlementResult<Vec<crate::ledger::InvestmentRecord>> {
            self.0.investments(project_id)
        }

        fn subsidy_configs(&self, project_id: &str) -> EntitlementResult<Vec<SubsidyConfig>> {
            self.0.subsidy_configs(project_id)
        }

        fn tax_credit_coefficients(
            &self,
            year: i32,
        ) -> EntitlementResult<Option<crate::config::TaxCreditCoefficients>> {
            self.0.tax_credit_coefficients(year)
        }
    }

    #[test]
    fn test_reader_failure_is_returned() {
        let ledger = OfflineExpenses(ledger());
        let engine = EntitlementEngine::new(&ledger);
        let config = SubsidyConfig::flat("flat", dec!(1200));
        let err = engine
            .compute_eligible_base("P", &config, &Period::WholeProject)
            .unwrap_err();
        assert!(matches!(err, EntitlementError::Ledger(_)));
    }

    #[test]
    fn test_unknown_project_is_an_error() {
        let ledger = ledger();
        let engine = EntitlementEngine::new(&ledger);
        let err = engine.cost_picture("nope", 2024, CostBasis::Charged).unwrap_err();
        assert!(matches!(err, EntitlementError::UnknownProject(_)));
    }

    #[test]
    fn test_cost_picture_flags_redistribution() {
        let ledger = ledger();
        let engine = EntitlementEngine::new(&ledger);
        let picture = engine
            .cost_picture("P", 2024, CostBasis::Charged)
            .unwrap()
            .result;
        assert!(picture.labor_redistributed);
        assert!(picture.external_redistributed);
        assert!(!picture.other_redistributed);
        assert_eq!(picture.months.len(), 12);
        assert_eq!(picture.months[0].labor, dec!(400));
        assert_eq!(picture.months[0].external, dec!(200));
        assert_eq!(picture.total, dec!(7200));
    }

    #[test]
    fn test_validity_beyond_project_is_reported() {
        let ledger = ledger();
        let engine = EntitlementEngine::new(&ledger);
        let config = SubsidyConfig::flat("flat", dec!(1200)).with_validity(my(2024, 7), my(2025, 6));
        let out = engine
            .compute_subsidy_amount("P", &config, &Period::year(2024))
            .unwrap();
        assert_eq!(out.result.amount, dec!(600));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_stored_subsidy_is_skipped() {
        let mut ledger = ledger();
        ledger
            .add_subsidy("P", SubsidyConfig::detailed("bad", dec!(120)))
            .unwrap();
        ledger
            .add_subsidy("P", SubsidyConfig::flat("good", dec!(1200)))
            .unwrap();
        let engine = EntitlementEngine::new(&ledger);
        let out = engine
            .project_subsidies("P", &Period::WholeProject)
            .unwrap();
        assert_eq!(out.result.len(), 1);
        assert_eq!(out.result[0].subsidy, "good");
        assert_eq!(out.result[0].amount, dec!(1200));
        assert!(out.warnings.iter().any(|w| w.contains("'bad'")));
    }
}
