//! Aggregate statistics returned alongside a region's businesses.

use serde::{Serialize, Serializer};

use super::{Position, SizeCategory};

/// Label used when a region has no dominant category
pub const NO_DOMINANT_CATEGORY: &str = "none";

/// Concentration statistics for the businesses inside one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationSummary {
    pub total_records: usize,
    /// `None` only for an empty region; serialized as `"none"`
    #[serde(serialize_with = "serialize_dominant")]
    pub dominant_category: Option<SizeCategory>,
    pub dominant_percentage: f64,
    pub total_employees: u64,
    pub average_employees: f64,
    pub top_sectors: Vec<SectorCount>,
    pub size_distribution: Vec<CategoryCount>,
}

impl ConcentrationSummary {
    pub fn empty() -> Self {
        Self {
            total_records: 0,
            dominant_category: None,
            dominant_percentage: 0.0,
            total_employees: 0,
            average_employees: 0.0,
            top_sectors: Vec::new(),
            size_distribution: Vec::new(),
        }
    }

    pub fn dominant_label(&self) -> &'static str {
        self.dominant_category
            .map(|c| c.as_str())
            .unwrap_or(NO_DOMINANT_CATEGORY)
    }
}

fn serialize_dominant<S: Serializer>(
    value: &Option<SizeCategory>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.map(|c| c.as_str()).unwrap_or(NO_DOMINANT_CATEGORY))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: SizeCategory,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalityCount {
    pub name: String,
    pub count: usize,
}

/// Whole-dataset overview shown before any region is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_records: usize,
    pub total_employees: u64,
    pub unique_municipalities: usize,
    pub unique_sectors: usize,
    pub size_distribution: Vec<CategoryCount>,
    pub top_municipalities: Vec<MunicipalityCount>,
    /// Mean position of geolocated records, used as the default map center
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Position>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_serializes_none_sentinel() {
        let summary = ConcentrationSummary::empty();
        assert_eq!(summary.dominant_label(), "none");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["dominant_category"], "none");
        assert_eq!(json["total_records"], 0);
    }
}
