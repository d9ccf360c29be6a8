//! Business-registry records as consumed by the region engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Business size class derived from the registry's employee-range text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    /// Up to 10 employees
    Micro,
    /// 11 to 50 employees
    Small,
    /// 51 to 250 employees
    Medium,
    /// 251 employees or more
    Large,
    /// Descriptor present but not recognized
    Other,
    /// No descriptor on file
    Unknown,
}

impl SizeCategory {
    /// All categories in size order
    pub fn all() -> &'static [SizeCategory] {
        &[
            SizeCategory::Micro,
            SizeCategory::Small,
            SizeCategory::Medium,
            SizeCategory::Large,
            SizeCategory::Other,
            SizeCategory::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeCategory::Micro => "Micro",
            SizeCategory::Small => "Small",
            SizeCategory::Medium => "Medium",
            SizeCategory::Large => "Large",
            SizeCategory::Other => "Other",
            SizeCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeCategory::all()
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown size category: {}", s))
    }
}

/// Geographic point (lat/lon, WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a position only when both halves are present and finite.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self { lat, lon })
            }
            _ => None,
        }
    }
}

/// One economic unit from the registry, joined with its municipality,
/// sector and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub id: u64,
    pub name: String,
    pub size_category: SizeCategory,

    /// Raw employee-range text, e.g. "11 a 30 personas"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_descriptor: Option<String>,

    /// Upper bound of the employee range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_name: Option<String>,

    /// Missing when the registry has no usable coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl BusinessRecord {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            size_category: SizeCategory::Unknown,
            size_descriptor: None,
            employee_count: None,
            municipality: None,
            state: None,
            sector_name: None,
            position: None,
        }
    }

    /// Employee upper bound, with missing counted as zero
    pub fn employees(&self) -> u64 {
        self.employee_count.map(u64::from).unwrap_or(0)
    }
}
