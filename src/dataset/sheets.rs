//! Reading the three registry sheets (exported as CSV) and joining them.
//!
//! The sheets share row order rather than a key: row N of every sheet
//! describes the same economic unit.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Activities sheet columns: unit name, sector code, sector name, employee range
const ACTIVITY_COLUMNS: &[&str] = &["id", "codigo_act", "nombre_act", "per_ocu"];
const MUNICIPALITY_COLUMNS: &[&str] = &["municipio", "entidad"];
const LOCATION_COLUMNS: &[&str] = &["latitud", "longitud"];

/// Paths to the sheet exports.
#[derive(Debug, Clone)]
pub struct SheetPaths {
    pub activities: PathBuf,
    pub municipalities: PathBuf,
    pub locations: PathBuf,
}

/// One joined row across the three sheets, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    pub name: Option<String>,
    pub sector_code: Option<String>,
    pub sector_name: Option<String>,
    pub size_descriptor: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Cells of one sheet, projected onto the requested columns.
pub type SheetCells = Vec<Vec<Option<String>>>;

/// Load all three sheets and join them row by row.
pub fn load_sheets(paths: &SheetPaths) -> Result<Vec<SheetRow>> {
    let activities = read_sheet_file(&paths.activities, ACTIVITY_COLUMNS)?;
    let municipalities = read_sheet_file(&paths.municipalities, MUNICIPALITY_COLUMNS)?;
    let locations = read_sheet_file(&paths.locations, LOCATION_COLUMNS)?;

    Ok(join_sheets(&activities, &municipalities, &locations))
}

fn read_sheet_file(path: &Path, columns: &[&str]) -> Result<SheetCells> {
    info!("Reading sheet {}", path.display());
    let file = File::open(path)
        .with_context(|| format!("Failed to open sheet {}", path.display()))?;
    let cells = read_sheet(file, columns)
        .with_context(|| format!("Failed to parse sheet {}", path.display()))?;
    info!("  {} rows", cells.len());
    Ok(cells)
}

/// Read a CSV sheet and keep only `columns`, in that order.
///
/// A column missing from the header reads as empty for every row; blank
/// cells read as `None`.
pub fn read_sheet<R: Read>(reader: R, columns: &[&str]) -> Result<SheetCells> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();

    let indices: Vec<Option<usize>> = columns
        .iter()
        .map(|column| {
            let idx = headers.iter().position(|h| h.eq_ignore_ascii_case(column));
            if idx.is_none() {
                warn!("Column '{}' not found, treating it as empty", column);
            }
            idx
        })
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let row = indices
            .iter()
            .map(|idx| {
                idx.and_then(|i| record.get(i))
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string)
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Join sheet cells positionally.
///
/// Sheets of different length are joined up to the longest one; rows
/// missing from a shorter sheet contribute empty values.
pub fn join_sheets(
    activities: &SheetCells,
    municipalities: &SheetCells,
    locations: &SheetCells,
) -> Vec<SheetRow> {
    let len = activities.len().max(municipalities.len()).max(locations.len());

    if activities.len() != municipalities.len() || activities.len() != locations.len() {
        warn!(
            "Sheets have different row counts (activities: {}, municipalities: {}, locations: {})",
            activities.len(),
            municipalities.len(),
            locations.len()
        );
    } else {
        info!("All sheets have {} rows", len);
    }

    (0..len)
        .map(|i| {
            let activity = |col: usize| cell(activities, i, col);
            let municipality = |col: usize| cell(municipalities, i, col);
            let location = |col: usize| cell(locations, i, col).and_then(|v| parse_coordinate(&v));

            SheetRow {
                name: activity(0),
                sector_code: activity(1),
                sector_name: activity(2),
                size_descriptor: activity(3),
                municipality: municipality(0),
                state: municipality(1),
                latitude: location(0),
                longitude: location(1),
            }
        })
        .collect()
}

fn cell(cells: &SheetCells, row: usize, col: usize) -> Option<String> {
    cells.get(row).and_then(|r| r.get(col)).cloned().flatten()
}

/// Coordinates that do not parse as finite numbers are treated as missing.
fn parse_coordinate(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
