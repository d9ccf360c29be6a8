//! Concentration statistics over a filtered set of businesses.

use hashbrown::HashMap;
use std::hash::Hash;

use crate::models::{BusinessRecord, CategoryCount, ConcentrationSummary, SectorCount};

/// Number of sectors reported in a summary
pub const TOP_SECTORS: usize = 3;

/// Occurrence counter that remembers first-seen order.
///
/// `ranked` orders by count descending; equal counts keep the order in
/// which the keys first appeared, so ties resolve deterministically.
pub(crate) struct RankedCounts<K> {
    counts: Vec<(K, usize)>,
    slots: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> RankedCounts<K> {
    pub(crate) fn new() -> Self {
        Self {
            counts: Vec::new(),
            slots: HashMap::new(),
        }
    }

    pub(crate) fn add(&mut self, key: K) {
        match self.slots.get(&key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.slots.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    pub(crate) fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub(crate) fn ranked(mut self) -> Vec<(K, usize)> {
        // sort_by is stable
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
    }
}

pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Summarize the businesses in a region.
///
/// Pure function of the records passed in, in the order given. Records
/// without a sector are left out of `top_sectors` but still counted
/// everywhere else.
pub fn analyze_concentration<'a, I>(subset: I) -> ConcentrationSummary
where
    I: IntoIterator<Item = &'a BusinessRecord>,
{
    let mut total = 0usize;
    let mut total_employees = 0u64;
    let mut sizes = RankedCounts::new();
    let mut sectors: RankedCounts<&'a str> = RankedCounts::new();

    for record in subset {
        total += 1;
        total_employees += record.employees();
        sizes.add(record.size_category);
        if let Some(sector) = record.sector_name.as_deref() {
            sectors.add(sector);
        }
    }

    if total == 0 {
        return ConcentrationSummary::empty();
    }

    let size_distribution: Vec<CategoryCount> = sizes
        .ranked()
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let dominant = &size_distribution[0];

    let top_sectors = sectors
        .ranked()
        .into_iter()
        .take(TOP_SECTORS)
        .map(|(name, count)| SectorCount {
            name: name.to_string(),
            count,
        })
        .collect();

    ConcentrationSummary {
        total_records: total,
        dominant_category: Some(dominant.category),
        dominant_percentage: dominant.percentage,
        total_employees,
        average_employees: total_employees as f64 / total as f64,
        top_sectors,
        size_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SizeCategory;

    fn record(
        id: u64,
        size: SizeCategory,
        sector: Option<&str>,
        employees: Option<u32>,
    ) -> BusinessRecord {
        let mut r = BusinessRecord::new(id, format!("Negocio {}", id));
        r.size_category = size;
        r.sector_name = sector.map(str::to_string);
        r.employee_count = employees;
        r
    }

    #[test]
    fn test_empty_subset() {
        let empty: Vec<BusinessRecord> = Vec::new();
        let summary = analyze_concentration(&empty);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.dominant_category, None);
        assert_eq!(summary.dominant_label(), "none");
        assert_eq!(summary.dominant_percentage, 0.0);
        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.average_employees, 0.0);
        assert!(summary.top_sectors.is_empty());
    }

    #[test]
    fn test_dominant_micro_sixty_percent() {
        let mut records = Vec::new();
        for i in 0..6 {
            records.push(record(i, SizeCategory::Micro, Some("Comercio"), Some(5)));
        }
        for i in 6..9 {
            records.push(record(i, SizeCategory::Small, Some("Servicios"), Some(30)));
        }
        records.push(record(9, SizeCategory::Medium, Some("Manufactura"), Some(100)));

        let summary = analyze_concentration(&records);
        assert_eq!(summary.total_records, 10);
        assert_eq!(summary.dominant_category, Some(SizeCategory::Micro));
        assert_eq!(summary.dominant_percentage, 60.0);
        assert_eq!(summary.total_employees, 6 * 5 + 3 * 30 + 100);
        assert_eq!(summary.average_employees, 22.0);
        assert_eq!(summary.size_distribution.len(), 3);
        assert_eq!(summary.size_distribution[1].category, SizeCategory::Small);
        assert_eq!(summary.size_distribution[1].percentage, 30.0);
    }

    #[test]
    fn test_tie_resolves_to_first_seen() {
        let records = vec![
            record(1, SizeCategory::Small, None, None),
            record(2, SizeCategory::Large, None, None),
            record(3, SizeCategory::Large, None, None),
            record(4, SizeCategory::Small, None, None),
        ];
        let summary = analyze_concentration(&records);
        assert_eq!(summary.dominant_category, Some(SizeCategory::Small));
        assert_eq!(summary.dominant_percentage, 50.0);

        let reversed: Vec<&BusinessRecord> = records.iter().rev().collect();
        let summary = analyze_concentration(reversed);
        assert_eq!(summary.dominant_category, Some(SizeCategory::Small));

        let shifted: Vec<&BusinessRecord> = records[1..].iter().collect();
        let summary = analyze_concentration(shifted);
        assert_eq!(summary.dominant_category, Some(SizeCategory::Large));
    }

    #[test]
    fn test_top_sectors_limited_and_ordered() {
        let sectors = ["A", "B", "C", "B", "D", "C", "B", "E"];
        let records: Vec<BusinessRecord> = sectors
            .iter()
            .enumerate()
            .map(|(i, s)| record(i as u64, SizeCategory::Micro, Some(*s), None))
            .collect();

        let summary = analyze_concentration(&records);
        let names: Vec<&str> = summary.top_sectors.iter().map(|s| s.name.as_str()).collect();
        // B=3, C=2, then A/D/E tie at 1 and A was seen first
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(summary.top_sectors[0].count, 3);
    }

    #[test]
    fn test_fewer_sectors_not_padded() {
        let records = vec![
            record(1, SizeCategory::Micro, Some("Comercio"), Some(5)),
            record(2, SizeCategory::Micro, None, None),
        ];
        let summary = analyze_concentration(&records);
        assert_eq!(summary.top_sectors.len(), 1);
        assert_eq!(summary.top_sectors[0].count, 1);
        // Missing employee count counts as zero
        assert_eq!(summary.total_employees, 5);
        assert_eq!(summary.average_employees, 2.5);
    }

    #[test]
    fn test_ranked_counts() {
        let mut counts = RankedCounts::new();
        for key in ["x", "y", "y", "z", "x", "y"] {
            counts.add(key);
        }
        assert_eq!(counts.distinct(), 3);
        assert_eq!(counts.ranked(), vec![("y", 3), ("x", 2), ("z", 1)]);
    }
}
