use clap::Args;
use serde_json::Value;

use entitlement_core::config::EngineOptions;
use entitlement_core::EntitlementEngine;

use super::{load_ledger, BasisArg, LedgerArgs};

/// Arguments for the reconstructed monthly cost picture
#[derive(Args)]
pub struct CostPictureArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Project identifier
    #[arg(long)]
    pub project: String,

    /// Calendar year
    #[arg(long)]
    pub year: i32,

    /// Labor pricing basis (defaults to the tax-credit basis of --options)
    #[arg(long)]
    pub basis: Option<BasisArg>,
}

pub fn run_cost_picture(
    args: CostPictureArgs,
    options: EngineOptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger = load_ledger(&args.ledger)?;
    let basis = args
        .basis
        .map(Into::into)
        .unwrap_or(options.tax_credit_cost_basis);

    let engine = EntitlementEngine::new(&ledger).with_options(options);
    let result = engine.cost_picture(&args.project, args.year, basis)?;
    Ok(serde_json::to_value(result)?)
}
