//! Fleet file parsing
//!
//! 1. Well-formed TOML and JSON fleets
//! 2. Ordering guarantees
//! 3. Rejected inputs

use chrono::NaiveDate;
use fleetplan_core::ConsumptionRecord;
use fleetplan_parser::{parse_json, parse_toml, FileFormat, ParseError};
use pretty_assertions::assert_eq;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// =============================================================================
// Well-formed fleets
// =============================================================================

#[test]
fn toml_fleet_with_readings() {
    let input = r#"
[[plant]]
id = 1
name = "Impianto A"
readings = [
    { date = "2024-03-01", kwh = 10.0 },
    { date = "2024-03-02", kwh = 20 },
]

[[plant]]
id = 2
name = "Impianto B"
"#;
    let plants = parse_toml(input).expect("Should parse fleet");

    assert_eq!(plants.len(), 2);
    assert_eq!(
        plants[0].records,
        vec![
            ConsumptionRecord::new(date(2024, 3, 1), 10.0),
            ConsumptionRecord::new(date(2024, 3, 2), 20.0),
        ]
    );
    assert!(plants[1].records.is_empty());
}

#[test]
fn toml_readings_as_array_of_tables() {
    let input = r#"
[[plant]]
id = 7
name = "Depot"

[[plant.readings]]
date = "2024-07-01"
kwh = 1.25
"#;
    let plants = parse_toml(input).expect("Should parse nested tables");

    assert_eq!(plants[0].records, vec![ConsumptionRecord::new(date(2024, 7, 1), 1.25)]);
}

#[test]
fn json_fleet_matches_toml_fleet() {
    let toml_input = r#"
[[plant]]
id = 3
name = "North"
readings = [{ date = "2024-05-04", kwh = 2.5 }]
"#;
    let json_input = r#"{
        "plant": [
            { "id": 3, "name": "North", "readings": [ { "date": "2024-05-04", "kwh": 2.5 } ] }
        ]
    }"#;

    assert_eq!(parse_toml(toml_input).unwrap(), parse_json(json_input).unwrap());
}

#[test]
fn empty_document_is_an_empty_fleet() {
    assert!(parse_toml("").unwrap().is_empty());
    assert!(parse_json("{}").unwrap().is_empty());
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn plants_and_readings_keep_file_order() {
    let input = r#"
[[plant]]
id = 30
name = "C"
readings = [
    { date = "2024-01-05", kwh = 1.0 },
    { date = "2024-01-01", kwh = 2.0 },
]

[[plant]]
id = 10
name = "A"
"#;
    let plants = parse_toml(input).unwrap();

    let ids: Vec<u32> = plants.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![30, 10]);
    assert_eq!(plants[0].records[0].date, date(2024, 1, 5));
}

// =============================================================================
// Rejected inputs
// =============================================================================

#[test]
fn duplicate_ids_rejected() {
    let input = r#"
[[plant]]
id = 1
name = "A"

[[plant]]
id = 1
name = "B"
"#;
    assert!(matches!(parse_toml(input), Err(ParseError::DuplicatePlantId(1))));
}

#[test]
fn negative_kwh_rejected() {
    let input = r#"
[[plant]]
id = 1
name = "A"
readings = [{ date = "2024-01-01", kwh = -3.0 }]
"#;
    let err = parse_toml(input).unwrap_err();

    assert!(matches!(err, ParseError::InvalidValue(_)));
    assert!(err.to_string().contains("2024-01-01"));
}

#[test]
fn impossible_date_is_a_syntax_error() {
    let input = r#"{"plant": [{"id": 1, "name": "A", "readings": [{"date": "2024-02-30", "kwh": 1}]}]}"#;

    assert!(matches!(
        parse_json(input),
        Err(ParseError::Syntax {
            format: FileFormat::Json,
            ..
        })
    ));
}

#[test]
fn unknown_fields_rejected() {
    let input = r#"
[[plant]]
id = 1
name = "A"
colour = "red"
"#;
    assert!(matches!(parse_toml(input), Err(ParseError::Syntax { .. })));
}

#[test]
fn empty_name_rejected() {
    let input = r#"
[[plant]]
id = 1
name = "  "
"#;
    assert!(matches!(parse_toml(input), Err(ParseError::InvalidValue(_))));
}

// =============================================================================
// Dates
// =============================================================================

#[test]
fn native_toml_dates_match_quoted_dates() {
    let native = r#"
[[plant]]
id = 1
name = "A"
readings = [{ date = 2024-03-01, kwh = 4.0 }]
"#;
    let quoted = r#"
[[plant]]
id = 1
name = "A"
readings = [{ date = "2024-03-01", kwh = 4.0 }]
"#;

    let plants = parse_toml(native).expect("Should accept a native TOML date");

    assert_eq!(plants[0].records, vec![ConsumptionRecord::new(date(2024, 3, 1), 4.0)]);
    assert_eq!(plants, parse_toml(quoted).unwrap());
}

#[test]
fn toml_date_time_rejected() {
    let input = r#"
[[plant]]
id = 1
name = "A"
readings = [{ date = 2024-03-01T08:00:00, kwh = 4.0 }]
"#;
    let err = parse_toml(input).unwrap_err();

    assert!(matches!(err, ParseError::Syntax { .. }));
    assert!(err.to_string().contains("2024-03-01"), "{err}");
}

#[test]
fn malformed_date_names_expected_form() {
    let input = r#"
[[plant]]
id = 1
name = "A"
readings = [{ date = "01/03/2024", kwh = 4.0 }]
"#;
    let err = parse_toml(input).unwrap_err();

    assert!(err.to_string().contains("expected a calendar date like 2024-03-01"), "{err}");
}
