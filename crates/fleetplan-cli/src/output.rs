//! Report formatting for CLI output
//!
//! Every report can be written as:
//! - `text`: one human-readable line per plant or per day
//! - `json`: pretty-printed JSON of the underlying result types
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success, including months without any consumption data |
//! | 1 | Failure: unreadable fleet, invalid month, no plants to schedule |

use std::io::{self, Write};
use std::process;

use fleetplan_core::{InterventionPlan, Month, PlantAverage};
use fleetplan_solver::MonthOutcome;
use serde::Serialize;

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Failure: the requested analysis could not be produced
    Failure = 1,
}

impl ExitCode {
    /// Failure if any of the results failed
    pub fn from_failure_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Format
// ============================================================================

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ============================================================================
// Reports
// ============================================================================

/// Average daily consumption per plant
///
/// `no_data` marks a month in which no plant has a single reading, so the
/// zero averages are not mistaken for idle plants.
pub fn write_averages<W: Write>(
    writer: &mut W,
    month: Month,
    averages: &[PlantAverage],
    no_data: bool,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct AverageReport<'a> {
                month: Month,
                no_data: bool,
                averages: &'a [PlantAverage],
            }
            let report = AverageReport {
                month,
                no_data,
                averages,
            };
            serde_json::to_writer_pretty(&mut *writer, &report)?;
            writeln!(writer)
        }
        OutputFormat::Text => {
            writeln!(writer, "Average daily consumption, month {}", month)?;
            if averages.is_empty() {
                writeln!(writer, "  (no plants)")?;
            } else if no_data {
                writeln!(writer, "  note: no data for this month")?;
            }
            for avg in averages {
                writeln!(writer, "  {}: {:.2} kWh", avg.plant_name, avg.mean_kwh)?;
            }
            Ok(())
        }
    }
}

/// A single month's intervention plan
///
/// A plan built from a week without consumption carries a note, so its zero
/// cost is not mistaken for a real optimum.
pub fn write_plan<W: Write>(
    writer: &mut W,
    plan: &InterventionPlan,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, plan)?;
            writeln!(writer)
        }
        OutputFormat::Text => write_plan_text(writer, plan),
    }
}

fn write_plan_text<W: Write>(writer: &mut W, plan: &InterventionPlan) -> io::Result<()> {
    writeln!(writer, "Intervention schedule, month {}", plan.month)?;
    if plan.no_data {
        writeln!(
            writer,
            "  note: no data for this month, no consumption recorded in the first {} days",
            plan.days.len()
        )?;
    }
    for line in plan.lines() {
        writeln!(writer, "  {}", line)?;
    }
    writeln!(
        writer,
        "  Total cost: {:.2} ({} switch{})",
        plan.total_cost,
        plan.switch_count(),
        if plan.switch_count() == 1 { "" } else { "es" }
    )
}

/// Plans for several months; failed months are reported inline
pub fn write_batch<W: Write>(
    writer: &mut W,
    outcomes: &[MonthOutcome],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct BatchEntry<'a> {
                month: u32,
                #[serde(skip_serializing_if = "Option::is_none")]
                plan: Option<&'a InterventionPlan>,
                #[serde(skip_serializing_if = "Option::is_none")]
                error: Option<String>,
            }
            let entries: Vec<BatchEntry<'_>> = outcomes
                .iter()
                .map(|(month, outcome)| BatchEntry {
                    month: *month,
                    plan: outcome.as_ref().ok(),
                    error: outcome.as_ref().err().map(|e| e.to_string()),
                })
                .collect();
            serde_json::to_writer_pretty(&mut *writer, &entries)?;
            writeln!(writer)
        }
        OutputFormat::Text => {
            for (index, (month, outcome)) in outcomes.iter().enumerate() {
                if index > 0 {
                    writeln!(writer)?;
                }
                match outcome {
                    Ok(plan) => write_plan_text(writer, plan)?,
                    Err(e) => writeln!(writer, "Month {:02}: error: {}", month, e)?,
                }
            }
            Ok(())
        }
    }
}
