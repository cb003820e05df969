use clap::Args;
use serde_json::Value;

use entitlement_core::config::{CoefficientFallback, EngineOptions};
use entitlement_core::EntitlementEngine;

use super::{load_ledger, BasisArg, LedgerArgs, PeriodArgs};

/// Arguments for the R&D tax credit
#[derive(Args)]
pub struct TaxCreditArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Project identifier; repeat to sum several projects
    #[arg(long = "project", required_unless_present = "all_projects")]
    pub projects: Vec<String>,

    /// Every project in the snapshot
    #[arg(long, conflicts_with = "projects")]
    pub all_projects: bool,

    #[command(flatten)]
    pub period: PeriodArgs,

    /// Labor pricing basis (overrides --options)
    #[arg(long)]
    pub basis: Option<BasisArg>,

    /// Refuse to borrow another year's coefficients
    #[arg(long)]
    pub no_fallback: bool,
}

pub fn run_tax_credit(
    args: TaxCreditArgs,
    mut options: EngineOptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger = load_ledger(&args.ledger)?;
    let period = args.period.period()?;

    if let Some(basis) = args.basis {
        options.tax_credit_cost_basis = basis.into();
    }
    if args.no_fallback {
        options.coefficient_fallback = CoefficientFallback::Disabled;
    }

    let projects = if args.all_projects {
        ledger.project_ids()
    } else {
        args.projects
    };

    let engine = EntitlementEngine::new(&ledger).with_options(options);
    match projects.as_slice() {
        [] => Err("No project to compute a tax credit for".into()),
        [single] => Ok(serde_json::to_value(engine.compute_tax_credit(single, &period)?)?),
        many => Ok(serde_json::to_value(
            engine.compute_tax_credit_for_projects(many, &period)?,
        )?),
    }
}
