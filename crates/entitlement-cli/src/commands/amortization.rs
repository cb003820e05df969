use clap::Args;
use serde_json::Value;

use entitlement_core::config::EngineOptions;
use entitlement_core::EntitlementEngine;

use super::{load_ledger, LedgerArgs};

/// Arguments for investment amortization schedules
#[derive(Args)]
pub struct AmortizationArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Project identifier
    #[arg(long)]
    pub project: String,
}

pub fn run_amortization(
    args: AmortizationArgs,
    options: EngineOptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger = load_ledger(&args.ledger)?;
    let engine = EntitlementEngine::new(&ledger).with_options(options);
    let result = engine.amortization_schedules(&args.project)?;
    Ok(serde_json::to_value(result)?)
}
