//! # fleetplan-parser
//!
//! Loads plant fleets and their consumption histories from files.
//!
//! This crate provides:
//! - TOML fleet files (`.toml`, the default)
//! - JSON fleet files (`.json`)
//! - Validation of ids, dates and readings
//! - `FileSource`, a `PlantSource` backed by a fleet file
//!
//! ## Example
//!
//! ```rust
//! use fleetplan_parser::parse_toml;
//!
//! let input = r#"
//! [[plant]]
//! id = 1
//! name = "Impianto A"
//! readings = [
//!     { date = "2024-03-01", kwh = 12.5 },
//!     { date = "2024-03-02", kwh = 11.0 },
//! ]
//! "#;
//!
//! let plants = parse_toml(input).unwrap();
//! assert_eq!(plants[0].name, "Impianto A");
//! assert_eq!(plants[0].records.len(), 2);
//! ```

pub mod document;

use std::path::{Path, PathBuf};

use fleetplan_core::{Plant, PlantId, PlantSource};
use thiserror::Error;

/// Parsing error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error in {format} input: {message}")]
    Syntax { format: FileFormat, message: String },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Duplicate plant id: {0}")]
    DuplicatePlantId(PlantId),
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Toml => write!(f, "TOML"),
            FileFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Detect file format from extension
pub fn detect_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
        _ => FileFormat::Toml,
    }
}

/// Parse a fleet from TOML
pub fn parse_toml(input: &str) -> Result<Vec<Plant>, ParseError> {
    let doc: document::FleetDocument = toml::from_str(input).map_err(|e| ParseError::Syntax {
        format: FileFormat::Toml,
        message: e.to_string(),
    })?;
    doc.into_plants()
}

/// Parse a fleet from JSON
pub fn parse_json(input: &str) -> Result<Vec<Plant>, ParseError> {
    let doc: document::FleetDocument =
        serde_json::from_str(input).map_err(|e| ParseError::Syntax {
            format: FileFormat::Json,
            message: e.to_string(),
        })?;
    doc.into_plants()
}

/// Parse a fleet file (format detected from the extension)
pub fn parse_file(path: &Path) -> Result<Vec<Plant>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match detect_format(path) {
        FileFormat::Json => parse_json(&content),
        FileFormat::Toml => parse_toml(&content),
    }
}

/// A fleet file acting as the plant data source
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlantSource for FileSource {
    type Error = ParseError;

    fn load_plants(&self) -> Result<Vec<Plant>, ParseError> {
        parse_file(&self.path)
    }
}
