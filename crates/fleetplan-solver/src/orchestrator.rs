//! Planning pipeline: aggregation, search and name resolution
//!
//! This is the layer callers normally use. It validates the month, builds the
//! first-week consumption matrix, runs the scheduler and turns plant ids back
//! into display names.

use std::collections::HashMap;

use fleetplan_core::{
    AnalysisError, InterventionPlan, InterventionScheduler, Month, Plant, PlantAverage, PlantId,
    PlannedDay, DEFAULT_SWITCH_COST,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::optimal::BranchAndBound;
use crate::{aggregate, average};

/// Tunable planning parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Penalty for changing plant between consecutive days
    pub switch_cost: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            switch_cost: DEFAULT_SWITCH_COST,
        }
    }
}

/// Outcome of planning a single month in a batch
pub type MonthOutcome = (u32, Result<InterventionPlan, AnalysisError>);

/// Coordinates aggregation and scheduling for a fleet
#[derive(Clone, Debug)]
pub struct InterventionPlanner<S = BranchAndBound> {
    scheduler: S,
}

impl InterventionPlanner<BranchAndBound> {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            scheduler: BranchAndBound::new().switch_cost(config.switch_cost),
        }
    }
}

impl Default for InterventionPlanner<BranchAndBound> {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl<S: InterventionScheduler> InterventionPlanner<S> {
    /// Use a custom scheduler
    pub fn with_scheduler(scheduler: S) -> Self {
        Self { scheduler }
    }

    /// Optimal intervention plan for the first week of `month`
    pub fn plan(&self, plants: &[Plant], month: u32) -> Result<InterventionPlan, AnalysisError> {
        let month = Month::new(month)?;

        let weekly = aggregate::build_for(plants, month)?;
        let no_data = !weekly.is_empty() && aggregate::is_empty_week(&weekly);
        if no_data {
            info!(month = month.number(), "No consumption recorded in the first week");
        }

        let solution = self.scheduler.solve(&weekly)?;

        let names: HashMap<PlantId, &str> =
            plants.iter().map(|p| (p.id, p.name.as_str())).collect();
        let days = solution
            .breakdown
            .iter()
            .map(|day| PlannedDay {
                day: day.day,
                plant_id: day.plant,
                plant_name: names
                    .get(&day.plant)
                    .map_or_else(|| day.plant.to_string(), |name| (*name).to_string()),
                variable_cost: day.variable,
                switching_cost: day.switching,
            })
            .collect();

        Ok(InterventionPlan {
            month,
            days,
            total_cost: solution.cost,
            no_data,
            stats: solution.stats,
        })
    }

    /// Plan several months, one independent search per month
    ///
    /// Results come back in the order of `months`; a failing month does not
    /// affect the others.
    pub fn plan_months(&self, plants: &[Plant], months: &[u32]) -> Vec<MonthOutcome> {
        months
            .par_iter()
            .map(|&month| {
                let outcome = self.plan(plants, month);
                if let Err(e) = &outcome {
                    warn!(month, error = %e, "Planning failed");
                }
                (month, outcome)
            })
            .collect()
    }

    /// Average daily consumption per plant for `month`
    pub fn averages(&self, plants: &[Plant], month: u32) -> Result<Vec<PlantAverage>, AnalysisError> {
        average::monthly_averages(plants, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fleetplan_core::{SearchStats, Solution, WeeklyConsumption};
    use pretty_assertions::assert_eq;

    fn week(plant: Plant, month: u32, kwh: [f64; 7]) -> Plant {
        kwh.iter().enumerate().fold(plant, |p, (i, v)| {
            p.record(NaiveDate::from_ymd_opt(2024, month, i as u32 + 1).unwrap(), *v)
        })
    }

    #[test]
    fn plan_resolves_names() {
        let plants = vec![
            week(Plant::new(1, "Impianto A"), 2, [1.0; 7]),
            week(Plant::new(2, "Impianto B"), 2, [10.0; 7]),
        ];

        let plan = InterventionPlanner::default().plan(&plants, 2).unwrap();

        assert_eq!(plan.total_cost, 7.0);
        assert_eq!(plan.lines()[0], "Day 1: Impianto A");
        assert_eq!(plan.lines().len(), 7);
        assert_eq!(plan.switch_count(), 0);
    }

    #[test]
    fn month_without_data_costs_nothing() {
        let plants = vec![
            week(Plant::new(1, "A"), 2, [1.0; 7]),
            week(Plant::new(2, "B"), 2, [10.0; 7]),
        ];

        let plan = InterventionPlanner::default().plan(&plants, 9).unwrap();

        assert_eq!(plan.total_cost, 0.0);
        assert!(plan.no_data);
        assert!(plan.days.iter().all(|d| d.plant_id == 1));

        assert!(!InterventionPlanner::default().plan(&plants, 2).unwrap().no_data);
    }

    #[test]
    fn empty_fleet_reports_no_plants() {
        let err = InterventionPlanner::default().plan(&[], 1).unwrap_err();
        assert_eq!(err, AnalysisError::NoPlantsAvailable);
    }

    #[test]
    fn config_switch_cost_is_used() {
        let plants = vec![
            week(Plant::new(1, "A"), 3, [1.0, 10.0, 1.0, 10.0, 1.0, 10.0, 1.0]),
            week(Plant::new(2, "B"), 3, [10.0, 1.0, 10.0, 1.0, 10.0, 1.0, 10.0]),
        ];
        let planner = InterventionPlanner::new(&PlannerConfig { switch_cost: 0.0 });

        let plan = planner.plan(&plants, 3).unwrap();

        assert_eq!(plan.total_cost, 7.0);
        assert_eq!(plan.switch_count(), 6);
    }

    #[test]
    fn batch_keeps_month_order_and_isolates_failures() {
        let plants = vec![
            week(Plant::new(1, "A"), 1, [3.0; 7]),
            week(Plant::new(2, "B"), 4, [2.0; 7]),
        ];

        let outcomes = InterventionPlanner::default().plan_months(&plants, &[4, 13, 1]);

        let months: Vec<u32> = outcomes.iter().map(|(m, _)| *m).collect();
        assert_eq!(months, vec![4, 13, 1]);
        // Plant 1 has no April data, so it is free in April
        assert_eq!(outcomes[0].1.as_ref().unwrap().total_cost, 0.0);
        assert!(!outcomes[0].1.as_ref().unwrap().no_data);
        assert!(matches!(outcomes[1].1, Err(AnalysisError::InvalidArgument(_))));
        assert_eq!(outcomes[2].1.as_ref().unwrap().total_cost, 0.0);
    }

    struct FixedScheduler;

    impl InterventionScheduler for FixedScheduler {
        fn solve(&self, consumption: &WeeklyConsumption) -> Result<Solution, AnalysisError> {
            let plant = consumption
                .plant_ids()
                .last()
                .ok_or(AnalysisError::NoPlantsAvailable)?;
            let assignment = vec![plant; 7];
            let breakdown = crate::optimal::evaluate(consumption, &assignment, 0.0)?;
            Ok(Solution {
                cost: crate::optimal::total_cost(&breakdown),
                assignment,
                breakdown,
                stats: SearchStats::default(),
            })
        }
    }

    #[test]
    fn custom_scheduler_plugs_in() {
        let plants = vec![
            week(Plant::new(1, "A"), 5, [1.0; 7]),
            week(Plant::new(2, "B"), 5, [2.0; 7]),
        ];

        let plan = InterventionPlanner::with_scheduler(FixedScheduler)
            .plan(&plants, 5)
            .unwrap();

        assert!(plan.days.iter().all(|d| d.plant_name == "B"));
        assert_eq!(plan.total_cost, 14.0);
    }
}
