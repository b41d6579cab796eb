//! First-week consumption aggregation
//!
//! Turns raw consumption histories into the per-plant daily matrix the
//! scheduler searches over.

use chrono::Datelike;
use fleetplan_core::{
    AnalysisError, DailyConsumption, Month, Plant, WeeklyConsumption, SCHEDULE_DAYS,
};
use tracing::debug;

/// Sum each plant's consumption on days 1..=7 of `month`
///
/// Every input plant appears in the result, in input order; plants without
/// matching records get an all-zero vector. Records on other days or in other
/// months are ignored, as is the year.
pub fn build(plants: &[Plant], month: u32) -> Result<WeeklyConsumption, AnalysisError> {
    let month = Month::new(month)?;
    build_for(plants, month)
}

/// Same as [`build`] for an already validated month
pub fn build_for(plants: &[Plant], month: Month) -> Result<WeeklyConsumption, AnalysisError> {
    let mut weekly = WeeklyConsumption::new();

    for plant in plants {
        let mut daily = DailyConsumption::zeros(SCHEDULE_DAYS);
        for record in plant.records_in(month) {
            let day = record.date.day() as usize;
            if (1..=SCHEDULE_DAYS).contains(&day) {
                daily.add(day - 1, record.kwh);
            }
        }

        if weekly.insert(plant.id, daily).is_some() {
            return Err(AnalysisError::MalformedInput {
                plant: plant.id,
                reason: "duplicate plant id".into(),
            });
        }
    }

    debug!(plants = weekly.len(), month = month.number(), "Aggregated first-week consumption");
    Ok(weekly)
}

/// Whether no plant consumed anything in the aggregated days
pub fn is_empty_week(weekly: &WeeklyConsumption) -> bool {
    weekly.iter().all(|(_, daily)| daily.total() == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn sums_records_per_day() {
        let plants = vec![Plant::new(1, "A")
            .record(date(2024, 3, 1), 4.0)
            .record(date(2024, 3, 1), 1.0)
            .record(date(2024, 3, 7), 2.5)];

        let weekly = build(&plants, 3).unwrap();

        assert_eq!(
            weekly.get(1).unwrap().as_slice(),
            &[5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.5]
        );
    }

    #[test]
    fn ignores_other_days_and_months() {
        let plants = vec![Plant::new(1, "A")
            .record(date(2024, 3, 8), 100.0)
            .record(date(2024, 3, 31), 100.0)
            .record(date(2024, 4, 2), 100.0)
            .record(date(2023, 3, 2), 3.0)];

        let weekly = build(&plants, 3).unwrap();

        assert_eq!(
            weekly.get(1).unwrap().as_slice(),
            &[0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn plants_without_data_get_zero_vectors() {
        let plants = vec![
            Plant::new(2, "B"),
            Plant::new(1, "A").record(date(2024, 5, 3), 1.0),
        ];

        let weekly = build(&plants, 3).unwrap();

        assert_eq!(weekly.plant_ids().collect::<Vec<_>>(), vec![2, 1]);
        assert!(weekly.iter().all(|(_, d)| d.len() == SCHEDULE_DAYS));
        assert!(is_empty_week(&weekly));
    }

    #[test]
    fn empty_fleet_gives_empty_matrix() {
        let weekly = build(&[], 1).unwrap();
        assert!(weekly.is_empty());
    }

    #[test]
    fn invalid_month_rejected() {
        for month in [0, 13] {
            let err = build(&[Plant::new(1, "A")], month).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidArgument(_)));
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let plants = vec![Plant::new(1, "A"), Plant::new(1, "A again")];

        let err = build(&plants, 1).unwrap_err();

        assert!(matches!(err, AnalysisError::MalformedInput { plant: 1, .. }));
    }
}
