//! Attribute filters applied before region selection, and the
//! whole-dataset overview.

use crate::models::{
    BusinessRecord, CategoryCount, DatasetOverview, MunicipalityCount, Position, SizeCategory,
};
use crate::region::analysis::{percentage, RankedCounts};

/// Municipalities listed in the overview
pub const TOP_MUNICIPALITIES: usize = 5;

/// Upstream filter on record attributes. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeFilter {
    pub municipality: Option<String>,
    pub size: Option<SizeCategory>,
}

impl AttributeFilter {
    pub fn is_empty(&self) -> bool {
        self.municipality.is_none() && self.size.is_none()
    }

    /// Municipality comparison ignores case and surrounding whitespace.
    pub fn matches(&self, record: &BusinessRecord) -> bool {
        if let Some(size) = self.size {
            if record.size_category != size {
                return false;
            }
        }
        match &self.municipality {
            Some(wanted) => record
                .municipality
                .as_deref()
                .is_some_and(|m| m.trim().to_lowercase() == wanted.trim().to_lowercase()),
            None => true,
        }
    }

    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a BusinessRecord>
    where
        I: IntoIterator<Item = &'a BusinessRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Totals, distributions and the default map center for a set of records.
pub fn dataset_overview<'a, I>(records: I) -> DatasetOverview
where
    I: IntoIterator<Item = &'a BusinessRecord>,
{
    let mut total = 0usize;
    let mut total_employees = 0u64;
    let mut sizes = RankedCounts::new();
    let mut municipalities: RankedCounts<&'a str> = RankedCounts::new();
    let mut sectors: RankedCounts<&'a str> = RankedCounts::new();
    let (mut lat_sum, mut lon_sum, mut located) = (0.0, 0.0, 0usize);

    for record in records {
        total += 1;
        total_employees += record.employees();
        sizes.add(record.size_category);
        if let Some(m) = record.municipality.as_deref() {
            municipalities.add(m);
        }
        if let Some(s) = record.sector_name.as_deref() {
            sectors.add(s);
        }
        if let Some(pos) = record.position {
            lat_sum += pos.lat;
            lon_sum += pos.lon;
            located += 1;
        }
    }

    let unique_municipalities = municipalities.distinct();
    let unique_sectors = sectors.distinct();

    let size_distribution = sizes
        .ranked()
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let top_municipalities = municipalities
        .ranked()
        .into_iter()
        .take(TOP_MUNICIPALITIES)
        .map(|(name, count)| MunicipalityCount {
            name: name.to_string(),
            count,
        })
        .collect();

    let center = (located > 0)
        .then(|| Position::new(lat_sum / located as f64, lon_sum / located as f64));

    DatasetOverview {
        total_records: total,
        total_employees,
        unique_municipalities,
        unique_sectors,
        size_distribution,
        top_municipalities,
        center,
    }
}
