//! Optimal Intervention Scheduling using Branch-and-Bound
//!
//! Finds the cheapest assignment of one plant per day over a short horizon.
//!
//! # Cost Model
//!
//! - **Variable cost**: consumption of the assigned plant on that day
//! - **Switching cost**: fixed penalty when the plant differs from the
//!   previous day's (never charged on day 1)
//!
//! # Algorithm
//!
//! Depth-first search over a tree of depth `num_days` whose branching factor
//! is the number of plants. A subtree is abandoned as soon as its partial
//! cost reaches the incumbent, which is sound because every step cost is
//! non-negative. Worst case is `O(P^num_days)`; intended for small fleets.
//!
//! Plants are explored in the insertion order of [`WeeklyConsumption`] and an
//! incumbent is only replaced by a strictly cheaper assignment, so the first
//! minimal assignment found wins ties.

use std::time::Instant;

use fleetplan_core::{
    AnalysisError, DayCost, InterventionScheduler, PlantId, SearchStats, Solution,
    WeeklyConsumption, DEFAULT_SWITCH_COST, SCHEDULE_DAYS,
};
use tracing::{info, trace};

/// Branch-and-bound scheduler
///
/// Holds only configuration; all search state is created per [`solve`] call,
/// so one scheduler can serve concurrent searches.
///
/// [`solve`]: InterventionScheduler::solve
#[derive(Clone, Debug, PartialEq)]
pub struct BranchAndBound {
    /// Length of the schedule in days
    pub num_days: usize,
    /// Penalty for changing plant between consecutive days
    pub switch_cost: f64,
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self {
            num_days: SCHEDULE_DAYS,
            switch_cost: DEFAULT_SWITCH_COST,
        }
    }

    pub fn switch_cost(mut self, switch_cost: f64) -> Self {
        self.switch_cost = switch_cost;
        self
    }

    pub fn num_days(mut self, num_days: usize) -> Self {
        self.num_days = num_days;
        self
    }

    fn validate_config(&self) -> Result<(), AnalysisError> {
        if self.num_days == 0 {
            return Err(AnalysisError::InvalidArgument(
                "schedule must cover at least one day".into(),
            ));
        }
        if !self.switch_cost.is_finite() || self.switch_cost < 0.0 {
            return Err(AnalysisError::InvalidArgument(format!(
                "switch cost must be a non-negative number, got {}",
                self.switch_cost
            )));
        }
        Ok(())
    }
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self::new()
    }
}

impl InterventionScheduler for BranchAndBound {
    fn solve(&self, consumption: &WeeklyConsumption) -> Result<Solution, AnalysisError> {
        self.validate_config()?;
        let plants = checked_rows(consumption, self.num_days)?;

        let _span = tracing::debug_span!(
            "solve",
            plants = plants.len(),
            days = self.num_days,
            switch_cost = self.switch_cost
        )
        .entered();
        let start_time = Instant::now();

        let mut ctx = SearchContext::new(plants, self.num_days, self.switch_cost);
        ctx.explore(1, None, 0.0);

        let stats = ctx.stats;
        let Some(best) = ctx.best else {
            // checked_rows guarantees at least one complete assignment
            return Err(AnalysisError::NoPlantsAvailable);
        };

        info!(
            cost = best.cost,
            nodes = stats.nodes_visited,
            pruned = stats.subtrees_pruned,
            improvements = stats.improvements,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Branch-and-bound search finished"
        );

        let breakdown = evaluate(consumption, &best.assignment, self.switch_cost)?;
        Ok(Solution {
            assignment: best.assignment,
            cost: best.cost,
            breakdown,
            stats,
        })
    }
}

/// Decompose the cost of an assignment day by day
///
/// Fails with `MalformedInput` if the assignment names a plant missing from
/// `consumption` or is longer than that plant's vector.
pub fn evaluate(
    consumption: &WeeklyConsumption,
    assignment: &[PlantId],
    switch_cost: f64,
) -> Result<Vec<DayCost>, AnalysisError> {
    let mut previous: Option<PlantId> = None;
    let mut breakdown = Vec::with_capacity(assignment.len());

    for (index, &plant) in assignment.iter().enumerate() {
        let daily = consumption
            .get(plant)
            .ok_or_else(|| AnalysisError::MalformedInput {
                plant,
                reason: "plant is not part of the consumption matrix".into(),
            })?;
        let variable = daily
            .as_slice()
            .get(index)
            .copied()
            .ok_or_else(|| AnalysisError::MalformedInput {
                plant,
                reason: format!("no consumption entry for day {}", index + 1),
            })?;

        breakdown.push(DayCost {
            day: index as u32 + 1,
            plant,
            variable,
            switching: step_switching(previous, plant, switch_cost),
        });
        previous = Some(plant);
    }

    Ok(breakdown)
}

/// Sum of a breakdown, accumulated in day order
pub fn total_cost(breakdown: &[DayCost]) -> f64 {
    breakdown.iter().fold(0.0, |acc, day| acc + day.total())
}

fn step_switching(previous: Option<PlantId>, plant: PlantId, switch_cost: f64) -> f64 {
    match previous {
        Some(prev) if prev != plant => switch_cost,
        _ => 0.0,
    }
}

/// Borrow every row, checking shape and values up front
fn checked_rows(
    consumption: &WeeklyConsumption,
    num_days: usize,
) -> Result<Vec<(PlantId, &[f64])>, AnalysisError> {
    if consumption.is_empty() {
        return Err(AnalysisError::NoPlantsAvailable);
    }

    consumption
        .iter()
        .map(|(plant, daily)| {
            if daily.len() != num_days {
                return Err(AnalysisError::MalformedInput {
                    plant,
                    reason: format!("expected {} daily values, got {}", num_days, daily.len()),
                });
            }
            if let Some((index, value)) = daily
                .as_slice()
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(AnalysisError::MalformedInput {
                    plant,
                    reason: format!("day {} has invalid consumption {}", index + 1, value),
                });
            }
            Ok((plant, daily.as_slice()))
        })
        .collect()
}

/// Best complete assignment found so far
#[derive(Debug)]
struct Incumbent {
    assignment: Vec<PlantId>,
    cost: f64,
}

/// Mutable state of a single search
struct SearchContext<'a> {
    plants: Vec<(PlantId, &'a [f64])>,
    num_days: usize,
    switch_cost: f64,
    /// Plants chosen for days already decided; pushed and popped while
    /// backtracking
    partial: Vec<PlantId>,
    best: Option<Incumbent>,
    stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    fn new(plants: Vec<(PlantId, &'a [f64])>, num_days: usize, switch_cost: f64) -> Self {
        Self {
            plants,
            num_days,
            switch_cost,
            partial: Vec::with_capacity(num_days),
            best: None,
            stats: SearchStats::default(),
        }
    }

    /// Decide `day` (1-based) given the plant of the preceding day
    fn explore(&mut self, day: usize, previous: Option<PlantId>, cost: f64) {
        self.stats.nodes_visited += 1;

        if day > self.num_days {
            let improves = self.best.as_ref().map_or(true, |best| cost < best.cost);
            if improves {
                trace!(cost, assignment = ?self.partial, "New incumbent");
                self.best = Some(Incumbent {
                    assignment: self.partial.clone(),
                    cost,
                });
                self.stats.improvements += 1;
            }
            return;
        }

        if let Some(best) = &self.best {
            if cost >= best.cost {
                self.stats.subtrees_pruned += 1;
                return;
            }
        }

        for index in 0..self.plants.len() {
            let (plant, daily) = self.plants[index];
            let variable = daily[day - 1];
            let switching = step_switching(previous, plant, self.switch_cost);
            let step = variable + switching;

            self.partial.push(plant);
            self.explore(day + 1, Some(plant), cost + step);
            self.partial.pop();
        }
    }
}
