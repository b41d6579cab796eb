//! # fleetplan-core
//!
//! Core domain model and traits for the fleetplan scheduling engine.
//!
//! This crate provides:
//! - Domain types: `Plant`, `ConsumptionRecord`, `Month`, `WeeklyConsumption`
//! - Result types: `Solution`, `InterventionPlan`
//! - Core traits: `PlantSource`, `InterventionScheduler`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fleetplan_core::{Month, Plant};
//!
//! let plant = Plant::new(1, "Impianto A")
//!     .record(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 10.0)
//!     .record(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), 20.0);
//!
//! let march = Month::new(3).unwrap();
//! assert_eq!(plant.records_in(march).count(), 2);
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a plant
pub type PlantId = u32;

/// Number of days covered by an intervention schedule
pub const SCHEDULE_DAYS: usize = 7;

/// Fixed penalty charged when consecutive days target different plants
pub const DEFAULT_SWITCH_COST: f64 = 5.0;

// ============================================================================
// Month
// ============================================================================

/// A calendar month, always in `1..=12`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(u32);

impl Month {
    /// Validate a month number
    pub fn new(number: u32) -> Result<Self, AnalysisError> {
        if (1..=12).contains(&number) {
            Ok(Self(number))
        } else {
            Err(AnalysisError::InvalidArgument(format!(
                "month must be between 1 and 12, got {}",
                number
            )))
        }
    }

    /// The month number (1 = January)
    pub const fn number(self) -> u32 {
        self.0
    }

    /// All twelve months in calendar order
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }

    /// Whether a date falls in this month (any year)
    pub fn contains(self, date: NaiveDate) -> bool {
        date.month() == self.0
    }
}

impl TryFrom<u32> for Month {
    type Error = AnalysisError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u32 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

// ============================================================================
// Plant
// ============================================================================

/// A dated consumption measurement
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Day the consumption was measured
    pub date: NaiveDate,
    /// Energy used on that day (kWh, non-negative)
    pub kwh: f64,
}

impl ConsumptionRecord {
    pub fn new(date: NaiveDate, kwh: f64) -> Self {
        Self { date, kwh }
    }
}

/// An installation whose consumption is tracked and which can be the
/// target of an intervention
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Unique, stable identifier
    pub id: PlantId,
    /// Display name
    pub name: String,
    /// Consumption history, in load order
    pub records: Vec<ConsumptionRecord>,
}

impl Plant {
    /// Create a plant without any consumption history
    pub fn new(id: PlantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Append a consumption record
    pub fn record(mut self, date: NaiveDate, kwh: f64) -> Self {
        self.records.push(ConsumptionRecord::new(date, kwh));
        self
    }

    /// The full consumption history
    pub fn consumption(&self) -> &[ConsumptionRecord] {
        &self.records
    }

    /// Records whose date falls in the given month
    pub fn records_in(&self, month: Month) -> impl Iterator<Item = &ConsumptionRecord> {
        self.records.iter().filter(move |r| month.contains(r.date))
    }
}

// ============================================================================
// Derived Consumption
// ============================================================================

/// Per-day consumption totals of one plant (index 0 = day 1)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyConsumption(Vec<f64>);

impl DailyConsumption {
    /// A vector of `days` zero entries
    pub fn zeros(days: usize) -> Self {
        Self(vec![0.0; days])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Add consumption to the entry at `index`
    ///
    /// Indices beyond the vector length are ignored.
    pub fn add(&mut self, index: usize, kwh: f64) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot += kwh;
        }
    }

    /// Sum over all days
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl From<Vec<f64>> for DailyConsumption {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl std::ops::Index<usize> for DailyConsumption {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Insertion-ordered mapping from plant id to its daily consumption
///
/// Iteration follows insertion order. The scheduler explores plants in this
/// order, so it decides which of several equal-cost schedules is returned.
/// Serialized as a list of `[id, daily]` pairs; reading one back rejects
/// repeated ids.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "Vec<(PlantId, DailyConsumption)>",
    try_from = "Vec<(PlantId, DailyConsumption)>"
)]
pub struct WeeklyConsumption {
    entries: Vec<(PlantId, DailyConsumption)>,
}

impl WeeklyConsumption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a plant's vector, returning the previous one if the id was
    /// already present (its position is kept)
    pub fn insert(
        &mut self,
        plant: PlantId,
        daily: impl Into<DailyConsumption>,
    ) -> Option<DailyConsumption> {
        let daily = daily.into();
        match self.entries.iter_mut().find(|(id, _)| *id == plant) {
            Some((_, existing)) => Some(std::mem::replace(existing, daily)),
            None => {
                self.entries.push((plant, daily));
                None
            }
        }
    }

    /// Builder-style insert
    pub fn with(mut self, plant: PlantId, daily: impl Into<DailyConsumption>) -> Self {
        self.insert(plant, daily);
        self
    }

    pub fn get(&self, plant: PlantId) -> Option<&DailyConsumption> {
        self.entries
            .iter()
            .find(|(id, _)| *id == plant)
            .map(|(_, daily)| daily)
    }

    pub fn contains(&self, plant: PlantId) -> bool {
        self.get(plant).is_some()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (PlantId, &DailyConsumption)> {
        self.entries.iter().map(|(id, daily)| (*id, daily))
    }

    /// Plant ids in insertion order
    pub fn plant_ids(&self) -> impl Iterator<Item = PlantId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<(PlantId, DailyConsumption)>> for WeeklyConsumption {
    type Error = AnalysisError;

    fn try_from(entries: Vec<(PlantId, DailyConsumption)>) -> Result<Self, Self::Error> {
        let mut weekly = Self::new();
        for (plant, daily) in entries {
            if weekly.insert(plant, daily).is_some() {
                return Err(AnalysisError::MalformedInput {
                    plant,
                    reason: "duplicate plant id".into(),
                });
            }
        }
        Ok(weekly)
    }
}

impl From<WeeklyConsumption> for Vec<(PlantId, DailyConsumption)> {
    fn from(weekly: WeeklyConsumption) -> Self {
        weekly.entries
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Cost incurred on one day of a schedule
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayCost {
    /// 1-based day of the month
    pub day: u32,
    /// Plant targeted on that day
    pub plant: PlantId,
    /// Consumption of the targeted plant on that day
    pub variable: f64,
    /// Penalty for changing plant since the previous day
    pub switching: f64,
}

impl DayCost {
    pub fn total(&self) -> f64 {
        self.variable + self.switching
    }
}

/// Counters collected while searching for a schedule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Search nodes entered, including complete assignments
    pub nodes_visited: u64,
    /// Subtrees abandoned because they could not beat the incumbent
    pub subtrees_pruned: u64,
    /// Complete assignments that became the new incumbent
    pub improvements: u64,
}

/// Minimal-cost assignment of one plant per day
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Plant chosen for each day, day 1 first
    pub assignment: Vec<PlantId>,
    /// Total cost of the assignment
    pub cost: f64,
    /// Per-day decomposition of `cost`
    pub breakdown: Vec<DayCost>,
    pub stats: SearchStats,
}

/// One day of an intervention plan, resolved to a display name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub day: u32,
    pub plant_id: PlantId,
    pub plant_name: String,
    pub variable_cost: f64,
    pub switching_cost: f64,
}

/// An intervention schedule for the first days of a month
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterventionPlan {
    pub month: Month,
    pub days: Vec<PlannedDay>,
    pub total_cost: f64,
    /// No plant consumed anything in the scheduled days, so every
    /// assignment costs nothing and `days` is an arbitrary valid choice
    #[serde(default)]
    pub no_data: bool,
    pub stats: SearchStats,
}

impl InterventionPlan {
    /// Human-readable line per day, e.g. `Day 1: Impianto A`
    pub fn lines(&self) -> Vec<String> {
        self.days
            .iter()
            .map(|d| format!("Day {}: {}", d.day, d.plant_name))
            .collect()
    }

    /// Number of days on which the plant changes from the previous day
    pub fn switch_count(&self) -> usize {
        self.days.windows(2).filter(|w| w[0].plant_id != w[1].plant_id).count()
    }
}

/// Mean daily consumption of one plant over a month
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantAverage {
    pub plant_name: String,
    pub mean_kwh: f64,
}

// ============================================================================
// Traits
// ============================================================================

/// Supplier of fully loaded plants (database, file, fixture...)
pub trait PlantSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every plant together with its consumption history
    fn load_plants(&self) -> Result<Vec<Plant>, Self::Error>;
}

/// Searches for the cheapest plant-per-day assignment
pub trait InterventionScheduler: Send + Sync {
    /// Solve over pre-aggregated per-plant daily consumption
    fn solve(&self, consumption: &WeeklyConsumption) -> Result<Solution, AnalysisError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Analysis error
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed input for plant {plant}: {reason}")]
    MalformedInput { plant: PlantId, reason: String },

    #[error("No plants available to schedule")]
    NoPlantsAvailable,
}

// ============================================================================
// Tests
// ============================================================================
