mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::AmortizationArgs;
use commands::costs::CostPictureArgs;
use commands::subsidy::{EligibleBaseArgs, SubsidyArgs, SubsidyScheduleArgs};
use commands::tax_credit::TaxCreditArgs;

/// R&D subsidy and tax-credit allocation over a ledger snapshot
#[derive(Parser)]
#[command(
    name = "rdx",
    version,
    about = "R&D subsidy and tax-credit allocation over a ledger snapshot",
    long_about = "A CLI that rebuilds monthly project costs from a ledger snapshot \
                  (JSON or YAML) and derives subsidy entitlements and the R&D tax \
                  credit for any month, year, custom window or the whole project."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine options file (JSON or YAML)
    #[arg(long, global = true)]
    options: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Coefficient-weighted eligible base of a subsidy
    EligibleBase(EligibleBaseArgs),
    /// Subsidy amount attributed to a period
    Subsidy(SubsidyArgs),
    /// Month-by-month allocation of a subsidy over its validity window
    SubsidySchedule(SubsidyScheduleArgs),
    /// R&D tax credit of one or more projects
    TaxCredit(TaxCreditArgs),
    /// Reconstructed monthly costs of a project-year
    CostPicture(CostPictureArgs),
    /// Amortization schedules of a project's investments
    Amortization(AmortizationArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = match commands::load_options(cli.options.as_deref()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::EligibleBase(args) => commands::subsidy::run_eligible_base(args, options),
        Commands::Subsidy(args) => commands::subsidy::run_subsidy(args, options),
        Commands::SubsidySchedule(args) => commands::subsidy::run_subsidy_schedule(args, options),
        Commands::TaxCredit(args) => commands::tax_credit::run_tax_credit(args, options),
        Commands::CostPicture(args) => commands::costs::run_cost_picture(args, options),
        Commands::Amortization(args) => commands::amortization::run_amortization(args, options),
        Commands::Version => {
            println!("rdx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
