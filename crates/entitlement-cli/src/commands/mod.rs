pub mod amortization;
pub mod costs;
pub mod subsidy;
pub mod tax_credit;

use clap::{Args, ValueEnum};

use entitlement_core::config::{CostBasis, EngineOptions, SubsidyConfig};
use entitlement_core::ledger::{InMemoryLedger, LedgerReader, LedgerSnapshot};
use entitlement_core::types::{MonthYear, Period};

use crate::input;

/// Where the ledger snapshot comes from
#[derive(Args)]
pub struct LedgerArgs {
    /// Path to a ledger snapshot (JSON or YAML); read from stdin when omitted
    #[arg(long)]
    pub ledger: Option<String>,
}

/// Reporting period; the whole project when no flag is given
#[derive(Args)]
pub struct PeriodArgs {
    /// Calendar year
    #[arg(long, conflicts_with_all = ["month", "from", "to"])]
    pub year: Option<i32>,

    /// Single month (MM/YYYY or YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,

    /// First month of a custom window
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last month of a custom window
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

impl PeriodArgs {
    pub fn period(&self) -> Result<Period, Box<dyn std::error::Error>> {
        if let Some(year) = self.year {
            return Ok(Period::year(year));
        }
        if let Some(ref month) = self.month {
            return Ok(Period::Month {
                month: MonthYear::parse(month)?,
            });
        }
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Ok(Period::window(
                MonthYear::parse(from)?,
                MonthYear::parse(to)?,
            )?),
            _ => Ok(Period::WholeProject),
        }
    }
}

/// Which subsidy configuration to evaluate
#[derive(Args)]
pub struct SubsidySelector {
    /// Name of a subsidy stored on the project
    #[arg(long, conflicts_with = "config")]
    pub subsidy: Option<String>,

    /// Path to a subsidy configuration (JSON or YAML)
    #[arg(long)]
    pub config: Option<String>,
}

impl SubsidySelector {
    pub fn is_empty(&self) -> bool {
        self.subsidy.is_none() && self.config.is_none()
    }

    /// Resolve the configuration; a project with a single stored subsidy
    /// needs no selector.
    pub fn resolve(
        &self,
        ledger: &InMemoryLedger,
        project_id: &str,
    ) -> Result<SubsidyConfig, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.config {
            return input::file::read_document(path);
        }

        let mut stored = ledger.subsidy_configs(project_id)?;
        if let Some(ref name) = self.subsidy {
            return stored
                .into_iter()
                .find(|c| &c.name == name)
                .ok_or_else(|| format!("No subsidy named '{name}' on project '{project_id}'").into());
        }

        match stored.len() {
            1 => Ok(stored.remove(0)),
            0 => Err(format!("Project '{project_id}' has no stored subsidy; pass --config").into()),
            n => Err(format!(
                "Project '{project_id}' has {n} subsidies; pick one with --subsidy or --config"
            )
            .into()),
        }
    }
}

/// Labor pricing basis
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BasisArg {
    Charged,
    Production,
    Complete,
}

impl From<BasisArg> for CostBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Charged => CostBasis::Charged,
            BasisArg::Production => CostBasis::Production,
            BasisArg::Complete => CostBasis::Complete,
        }
    }
}

/// Load the ledger snapshot from `--ledger` or stdin.
pub fn load_ledger(args: &LedgerArgs) -> Result<InMemoryLedger, Box<dyn std::error::Error>> {
    let snapshot: LedgerSnapshot = if let Some(ref path) = args.ledger {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--ledger file is required (or pipe a snapshot on stdin)".into());
    };
    tracing::debug!(projects = snapshot.projects.len(), "ledger snapshot loaded");
    Ok(InMemoryLedger::from_snapshot(snapshot))
}

/// Engine options from `--options`, or the defaults.
pub fn load_options(path: Option<&str>) -> Result<EngineOptions, Box<dyn std::error::Error>> {
    match path {
        Some(path) => input::file::read_document(path),
        None => Ok(EngineOptions::default()),
    }
}
