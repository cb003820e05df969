use clap::Args;
use serde_json::Value;

use entitlement_core::config::EngineOptions;
use entitlement_core::EntitlementEngine;

use super::{load_ledger, LedgerArgs, PeriodArgs, SubsidySelector};

/// Arguments for the eligible base of one subsidy
#[derive(Args)]
pub struct EligibleBaseArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Project identifier
    #[arg(long)]
    pub project: String,

    #[command(flatten)]
    pub subsidy: SubsidySelector,

    #[command(flatten)]
    pub period: PeriodArgs,
}

/// Arguments for subsidy allocation
#[derive(Args)]
pub struct SubsidyArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Project identifier
    #[arg(long)]
    pub project: String,

    // every stored subsidy when omitted
    #[command(flatten)]
    pub subsidy: SubsidySelector,

    #[command(flatten)]
    pub period: PeriodArgs,
}

/// Arguments for a month-by-month subsidy schedule
#[derive(Args)]
pub struct SubsidyScheduleArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Project identifier
    #[arg(long)]
    pub project: String,

    #[command(flatten)]
    pub subsidy: SubsidySelector,
}

pub fn run_eligible_base(
    args: EligibleBaseArgs,
    options: EngineOptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger = load_ledger(&args.ledger)?;
    let config = args.subsidy.resolve(&ledger, &args.project)?;
    let period = args.period.period()?;

    let engine = EntitlementEngine::new(&ledger).with_options(options);
    let result = engine.compute_eligible_base(&args.project, &config, &period)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_subsidy(args: SubsidyArgs, options: EngineOptions) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger = load_ledger(&args.ledger)?;
    let period = args.period.period()?;
    let engine = EntitlementEngine::new(&ledger).with_options(options);

    if args.subsidy.is_empty() {
        let result = engine.project_subsidies(&args.project, &period)?;
        return Ok(serde_json::to_value(result)?);
    }

    let config = args.subsidy.resolve(&ledger, &args.project)?;
    let result = engine.compute_subsidy_amount(&args.project, &config, &period)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_subsidy_schedule(
    args: SubsidyScheduleArgs,
    options: EngineOptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger = load_ledger(&args.ledger)?;
    let config = args.subsidy.resolve(&ledger, &args.project)?;

    let engine = EntitlementEngine::new(&ledger).with_options(options);
    let result = engine.subsidy_schedule(&args.project, &config)?;
    Ok(serde_json::to_value(result)?)
}
