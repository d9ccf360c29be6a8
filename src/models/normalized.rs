use serde::{Deserialize, Serialize};

use super::SizeCategory;

/// Economic activity (sector) table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRow {
    pub id: u64,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityRow {
    pub id: u64,
    pub name: Option<String>,
    pub state: Option<String>,
}

/// Deduplicated coordinate table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
}

/// Economic unit row. References the other tables by surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRow {
    pub id: u64,
    pub name: String,
    pub size_descriptor: Option<String>,
    pub employee_count: Option<u32>,
    pub size_category: SizeCategory,
    pub sector_id: Option<u64>,
    pub municipality_id: Option<u64>,
    pub location_id: Option<u64>,
}

/// The four normalized tables produced by ingest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTables {
    pub sectors: Vec<SectorRow>,
    pub municipalities: Vec<MunicipalityRow>,
    pub locations: Vec<LocationRow>,
    pub units: Vec<UnitRow>,
}
