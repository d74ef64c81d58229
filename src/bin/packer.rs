//! The command-line interface to the storage layout packer.
//!
//! Analyzes the output of the external contract analyzer for a single source
//! unit (`--contract`) or for every unit below a directory (`--folder`), and
//! reports the declaration orders that would let the contracts' storage and
//! record types occupy fewer slots.

use std::{path::PathBuf, process::ExitCode, rc::Rc, time::Duration};

use anyhow::Context;
use clap::{ArgGroup, CommandFactory, Parser};
use glob::glob;
use storage_layout_packer::{
    analyzer::Config,
    batch::{analyze_files, BatchReport},
    report::Report,
    solver::{DynSolver, ExactSolver, FirstFitDecreasing},
    watchdog::BudgetWatchdog,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").args(["contract", "folder"])))]
struct Cli {
    /// The analyzed source unit to check.
    #[arg(long, value_name = "FILE")]
    contract: Option<PathBuf>,

    /// A directory whose analyzed source units are checked recursively.
    #[arg(long, value_name = "DIR")]
    folder: Option<PathBuf>,

    /// Enables debug logging.
    #[arg(short, long)]
    debug: bool,

    /// Prints the analyses as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Uses the first-fit decreasing heuristic instead of the exact solver.
    #[arg(long)]
    heuristic: bool,

    /// The time the exact solver may spend on a single layout before falling
    /// back to the heuristic.
    #[arg(long, value_name = "MILLISECONDS", conflicts_with = "heuristic")]
    solver_budget: Option<u64>,
}

impl Cli {
    fn config(&self) -> Config {
        let solver: DynSolver = if self.heuristic {
            Rc::new(FirstFitDecreasing)
        } else {
            let mut watchdog = BudgetWatchdog::default();
            if let Some(millis) = self.solver_budget {
                watchdog = watchdog.with_max_elapsed(Duration::from_millis(millis));
            }
            Rc::new(ExactSolver::default().with_watchdog(watchdog.in_rc()))
        };
        Config::default().with_solver(solver)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let paths = match (&cli.contract, &cli.folder) {
        (Some(contract), _) => vec![contract.clone()],
        (None, Some(folder)) => discover_units(folder)?,
        (None, None) => {
            Cli::command().print_help()?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let report = analyze_files(&paths, &cli.config());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.analyses)?);
    } else {
        print_report(&report);
    }

    Ok(ExitCode::SUCCESS)
}

/// Installs the logger, respecting `RUST_LOG` when it is set.
fn init_logging(debug: bool) {
    let default = if debug {
        "storage_layout_packer=debug"
    } else {
        "storage_layout_packer=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Finds every JSON file below `folder`.
fn discover_units(folder: &std::path::Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = folder.join("**").join("*.json");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("{} is not a valid path", folder.display()))?;

    let paths = glob(pattern)?.filter_map(Result::ok).collect();
    Ok(paths)
}

fn print_report(report: &BatchReport) {
    for unit in &report.analyses {
        print!("{}", Report::new(&unit.unit, &unit.analysis));
    }
    for error in report.errors.payloads() {
        println!("{}: no packing data ({})", error.location, error.payload);
    }
}
