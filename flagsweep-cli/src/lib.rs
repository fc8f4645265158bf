#![warn(missing_docs)]
//! flagsweep CLI Library
//!
//! Configuration, planning and the sweep runner behind the `flagsweep`
//! binary. Running with no arguments performs the whole configured sweep:
//!
//! ```text
//! sweep.toml / built-in table
//!       │
//!       ▼
//! ┌─────────────┐
//! │   planner   │  Enumerate combinations (optional label filter)
//! └──────┬──────┘
//!        ▼
//! ┌─────────────┐
//! │   runner    │  setup once, then configure/compile/benchmark/strip each
//! └──────┬──────┘
//!        ▼
//! ┌─────────────┐
//! │   report    │  plain lines, JSON or CSV, printed once at the end
//! └─────────────┘
//! ```

mod config;
mod metadata;
mod planner;
mod runner;

pub use config::*;
pub use metadata::build_report_meta;
pub use planner::{SweepPlan, build_plan};
pub use runner::{Step, SweepError, SweepRunner};

use anyhow::Context;
use clap::{Parser, Subcommand};
use flagsweep_report::{
    OutputFormat, Report, generate_csv_report, generate_json_report, generate_plain_report,
};
use regex::Regex;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// flagsweep CLI arguments
#[derive(Parser, Debug)]
#[command(name = "flagsweep")]
#[command(
    author,
    version,
    about = "flagsweep - rebuild and benchmark a project across a matrix of compiler flags"
)]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: sweep.toml found by walking up from the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only sweep combinations whose label matches this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Output format: plain, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dry run - list planned combinations without building
    #[arg(long)]
    pub dry_run: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the sweep (default)
    Run,
    /// List planned combinations and their arguments
    List,
    /// Print a commented default sweep.toml
    Init,
}

/// Run the flagsweep CLI with process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the flagsweep CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if cli.command == Some(Commands::Init) {
        print!("{}", SweepConfig::default_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    config.validate()?;

    let format = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse::<OutputFormat>()
        .map_err(anyhow::Error::msg)?;

    let filter = cli
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid --filter pattern")?;
    let plan = build_plan(&config.axes, filter.as_ref());

    if cli.dry_run || cli.command == Some(Commands::List) {
        list_plan(&plan);
        return Ok(());
    }

    run_sweep(&cli, &config, &plan, format)
}

/// Map an error returned by [`run`] to the process exit status.
///
/// A failed external command surfaces its own exit code; every other error
/// exits with 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SweepError>()
        .map_or(1, SweepError::exit_code)
}

/// Logs go to stderr; stdout is reserved for the report.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "flagsweep=debug"
    } else {
        "flagsweep=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// `--config` wins; otherwise discover sweep.toml, else the built-in sweep.
fn load_config(cli: &Cli) -> anyhow::Result<SweepConfig> {
    if let Some(ref path) = cli.config {
        return SweepConfig::load(path);
    }
    match SweepConfig::discover()? {
        Some(config) => Ok(config),
        None => {
            info!("No {} found, using the built-in sweep", CONFIG_FILE_NAME);
            Ok(SweepConfig::default())
        }
    }
}

fn list_plan(plan: &SweepPlan) {
    println!(
        "Sweep plan: {} of {} combinations",
        plan.len(),
        plan.total
    );

    let width = plan
        .combinations
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(0);
    for combination in &plan.combinations {
        println!(
            "  {:>3}  {:<width$}  {}",
            combination.index,
            combination.label,
            combination.args.join(" "),
            width = width
        );
    }
}

fn run_sweep(
    cli: &Cli,
    config: &SweepConfig,
    plan: &SweepPlan,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if plan.is_empty() {
        warn!("No combinations match the filter, nothing to do");
        return Ok(());
    }
    if plan.is_filtered() {
        info!(
            planned = plan.len(),
            total = plan.total,
            "Filter restricts the sweep"
        );
    }

    info!(combinations = plan.len(), "Starting sweep");
    let start_time = Instant::now();

    let mut runner = SweepRunner::new(config).with_progress(!cli.no_progress && !cli.verbose);
    runner.run(plan)?;

    let total_duration_secs = start_time.elapsed().as_secs_f64();
    let report = Report::new(
        build_report_meta(config),
        runner.into_measurements(),
        total_duration_secs,
    );
    info!(
        combinations = report.summary.combinations,
        seconds = total_duration_secs,
        "Sweep complete"
    );

    let output = match format {
        OutputFormat::Plain => generate_plain_report(&report),
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Csv => generate_csv_report(&report),
    };

    match cli.output.as_ref().or(config.output.path.as_ref()) {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => print!("{}", output),
    }

    Ok(())
}
