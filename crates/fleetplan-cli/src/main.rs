//! fleetplan CLI - plant consumption analysis and intervention scheduling
//!
//! Command-line interface for loading fleets, averaging consumption and
//! computing optimal first-week intervention schedules.

mod output;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleetplan_core::{Month, Plant, PlantSource};
use fleetplan_parser::FileSource;
use fleetplan_solver::{average, InterventionPlanner, PlannerConfig};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::output::{ExitCode, OutputFormat};

#[derive(Parser)]
#[command(name = "fleetplan")]
#[command(author, version, about = "Plant consumption analysis and intervention scheduling", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a fleet file
    Check {
        /// Fleet file (.toml or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Average daily consumption per plant for a month
    Average {
        /// Fleet file (.toml or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Month number (1-12)
        #[arg(short, long)]
        month: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Optimal intervention schedule for the first 7 days of a month
    Schedule {
        /// Fleet file (.toml or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Month number (1-12)
        #[arg(short, long, required_unless_present = "all_months", conflicts_with = "all_months")]
        month: Option<u32>,

        /// Schedule every month of the year
        #[arg(long)]
        all_months: bool,

        /// Penalty for changing plant between consecutive days
        #[arg(long, env = "FLEETPLAN_SWITCH_COST")]
        switch_cost: Option<f64>,

        /// Planner configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::Failure.into()
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Check { file } => {
            let plants = load_fleet(&file)?;
            let readings: usize = plants.iter().map(|p| p.records.len()).sum();
            writeln!(
                out,
                "{}: {} plant(s), {} reading(s)",
                file.display(),
                plants.len(),
                readings
            )?;
            for plant in &plants {
                let first = plant.records.iter().map(|r| r.date).min();
                let last = plant.records.iter().map(|r| r.date).max();
                match (first, last) {
                    (Some(first), Some(last)) => writeln!(
                        out,
                        "  [{}] {}: {} reading(s), {} .. {}",
                        plant.id,
                        plant.name,
                        plant.records.len(),
                        first,
                        last
                    )?,
                    _ => writeln!(out, "  [{}] {}: no readings", plant.id, plant.name)?,
                }
            }
            Ok(ExitCode::Success)
        }

        Commands::Average {
            file,
            month,
            format,
        } => {
            let plants = load_fleet(&file)?;
            let planner = InterventionPlanner::default();
            let averages = planner.averages(&plants, month)?;
            let month = Month::new(month)?;
            let no_data = !average::has_records(&plants, month);
            if no_data {
                info!(month = month.number(), "No consumption recorded in this month");
            }
            output::write_averages(&mut out, month, &averages, no_data, format)?;
            Ok(ExitCode::Success)
        }

        Commands::Schedule {
            file,
            month,
            all_months,
            switch_cost,
            config,
            format,
        } => {
            let plants = load_fleet(&file)?;
            let config = planner_config(config.as_deref(), switch_cost)?;
            debug!(?config, "Planner configuration");
            let planner = InterventionPlanner::new(&config);

            if all_months {
                let months: Vec<u32> = Month::all().map(Month::number).collect();
                let outcomes = planner.plan_months(&plants, &months);
                let failures = outcomes.iter().filter(|(_, o)| o.is_err()).count();
                output::write_batch(&mut out, &outcomes, format)?;
                return Ok(ExitCode::from_failure_count(failures));
            }

            // clap enforces --month unless --all-months
            let month = month.context("--month is required")?;
            let plan = planner
                .plan(&plants, month)
                .with_context(|| format!("cannot schedule month {}", month))?;
            output::write_plan(&mut out, &plan, format)?;
            Ok(ExitCode::Success)
        }
    }
}

fn load_fleet(path: &Path) -> Result<Vec<Plant>> {
    let source = FileSource::new(path);
    let plants = source
        .load_plants()
        .with_context(|| format!("failed to load fleet from {}", path.display()))?;
    info!(plants = plants.len(), path = %path.display(), "Fleet loaded");
    Ok(plants)
}

/// Configuration file values, overridden by command-line flags
fn planner_config(path: Option<&Path>, switch_cost: Option<f64>) -> Result<PlannerConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => PlannerConfig::default(),
    };
    if let Some(cost) = switch_cost {
        config.switch_cost = cost;
    }
    Ok(config)
}
