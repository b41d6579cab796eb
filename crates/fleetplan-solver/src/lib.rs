//! # fleetplan-solver
//!
//! Consumption analysis and intervention scheduling for plant fleets.
//!
//! This crate provides:
//! - First-week consumption aggregation (`aggregate`)
//! - Monthly average daily consumption (`average`)
//! - Branch-and-bound search for the cheapest plant-per-day schedule (`optimal`)
//! - A planning pipeline tying them together (`orchestrator`)
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fleetplan_core::Plant;
//! use fleetplan_solver::InterventionPlanner;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
//! let plants = vec![
//!     Plant::new(1, "Impianto A").record(day(1), 1.0),
//!     Plant::new(2, "Impianto B").record(day(1), 10.0),
//! ];
//!
//! let plan = InterventionPlanner::default().plan(&plants, 3).unwrap();
//! assert_eq!(plan.lines()[0], "Day 1: Impianto A");
//! ```

pub mod aggregate;
pub mod average;
pub mod optimal;
pub mod orchestrator;

pub use average::monthly_averages;
pub use optimal::BranchAndBound;
pub use orchestrator::{InterventionPlanner, MonthOutcome, PlannerConfig};
