//! On-disk fleet document shared by the TOML and JSON readers
//!
//! ```toml
//! [[plant]]
//! id = 1
//! name = "Impianto A"
//! readings = [{ date = "2024-03-01", kwh = 12.5 }]
//! ```
//!
//! Dates are ISO 8601 calendar dates. TOML accepts them quoted or as native
//! local dates (`date = 2024-03-01`); JSON needs strings. Plants and
//! readings keep file order.

use std::collections::HashSet;

use chrono::NaiveDate;
use fleetplan_core::{ConsumptionRecord, Plant, PlantId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ParseError;

/// Top-level document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetDocument {
    #[serde(default)]
    pub plant: Vec<PlantEntry>,
}

/// One plant with its readings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantEntry {
    pub id: PlantId,
    pub name: String,
    #[serde(default)]
    pub readings: Vec<ReadingEntry>,
}

/// One dated consumption reading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadingEntry {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub kwh: f64,
}

/// Either spelling of a reading date
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(NaiveDate),
    Toml(toml::value::Datetime),
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = RawDate::deserialize(deserializer)
        .map_err(|_| D::Error::custom("invalid date, expected a calendar date like 2024-03-01"))?;
    match raw {
        RawDate::Text(date) => Ok(date),
        RawDate::Toml(datetime) => match (datetime.date, datetime.time, datetime.offset) {
            (Some(date), None, None) => NaiveDate::from_ymd_opt(
                i32::from(date.year),
                u32::from(date.month),
                u32::from(date.day),
            )
            .ok_or_else(|| D::Error::custom(format!("invalid date {date}"))),
            _ => Err(D::Error::custom(format!(
                "invalid date {datetime}, expected a date without time"
            ))),
        },
    }
}

impl FleetDocument {
    /// Validate and convert into domain plants
    pub fn into_plants(self) -> Result<Vec<Plant>, ParseError> {
        let mut seen = HashSet::new();
        let mut plants = Vec::with_capacity(self.plant.len());

        for entry in self.plant {
            if !seen.insert(entry.id) {
                return Err(ParseError::DuplicatePlantId(entry.id));
            }
            if entry.name.trim().is_empty() {
                return Err(ParseError::InvalidValue(format!(
                    "plant {} has an empty name",
                    entry.id
                )));
            }

            let mut records = Vec::with_capacity(entry.readings.len());
            for reading in entry.readings {
                if !reading.kwh.is_finite() || reading.kwh < 0.0 {
                    return Err(ParseError::InvalidValue(format!(
                        "plant {} reading on {} has invalid kwh {}",
                        entry.id, reading.date, reading.kwh
                    )));
                }
                records.push(ConsumptionRecord::new(reading.date, reading.kwh));
            }

            plants.push(Plant {
                id: entry.id,
                name: entry.name,
                records,
            });
        }

        Ok(plants)
    }
}
