//! Monthly average daily consumption

use fleetplan_core::{AnalysisError, Month, Plant, PlantAverage};

/// Mean consumption per record in `month`, one entry per plant in input order
///
/// Every matching record counts, so two records on the same day count as two
/// days. Plants without records in the month average 0.
pub fn monthly_averages(plants: &[Plant], month: u32) -> Result<Vec<PlantAverage>, AnalysisError> {
    let month = Month::new(month)?;
    Ok(averages_for(plants, month))
}

/// Same as [`monthly_averages`] for an already validated month
pub fn averages_for(plants: &[Plant], month: Month) -> Vec<PlantAverage> {
    plants
        .iter()
        .map(|plant| {
            let (sum, count) = plant
                .records_in(month)
                .fold((0.0, 0usize), |(sum, count), r| (sum + r.kwh, count + 1));
            let mean_kwh = if count > 0 { sum / count as f64 } else { 0.0 };
            PlantAverage {
                plant_name: plant.name.clone(),
                mean_kwh,
            }
        })
        .collect()
}

/// Whether any plant has a record in `month`
///
/// When none does, every average is 0 for lack of data rather than because
/// nothing was consumed.
pub fn has_records(plants: &[Plant], month: Month) -> bool {
    plants.iter().any(|p| p.records_in(month).next().is_some())
}
