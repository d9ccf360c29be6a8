//! Splitting joined sheet rows into normalized tables and joining them back.

use hashbrown::HashMap;
use tracing::info;

use super::classify::{classify_size_descriptor, employee_upper_bound};
use super::sheets::SheetRow;
use crate::models::{
    BusinessRecord, LocationRow, MunicipalityRow, NormalizedTables, Position, SectorRow, UnitRow,
};

/// Build the normalized tables. Surrogate keys start at 1 and follow
/// first-seen order; coordinates are deduplicated at 6 decimal places.
pub fn normalize(rows: &[SheetRow]) -> NormalizedTables {
    let mut tables = NormalizedTables::default();

    let mut sector_ids: HashMap<(Option<String>, Option<String>), u64> = HashMap::new();
    let mut municipality_ids: HashMap<(Option<String>, Option<String>), u64> = HashMap::new();
    let mut location_ids: HashMap<String, u64> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let unit_id = i as u64 + 1;

        let sector_id = if row.sector_code.is_some() || row.sector_name.is_some() {
            let key = (row.sector_code.clone(), row.sector_name.clone());
            let next_id = tables.sectors.len() as u64 + 1;
            let id = *sector_ids.entry(key).or_insert_with(|| {
                tables.sectors.push(SectorRow {
                    id: next_id,
                    code: row.sector_code.clone(),
                    name: row.sector_name.clone(),
                });
                next_id
            });
            Some(id)
        } else {
            None
        };

        let municipality_id = if row.municipality.is_some() || row.state.is_some() {
            let key = (row.municipality.clone(), row.state.clone());
            let next_id = tables.municipalities.len() as u64 + 1;
            let id = *municipality_ids.entry(key).or_insert_with(|| {
                tables.municipalities.push(MunicipalityRow {
                    id: next_id,
                    name: row.municipality.clone(),
                    state: row.state.clone(),
                });
                next_id
            });
            Some(id)
        } else {
            None
        };

        let location_id = Position::from_parts(row.latitude, row.longitude).map(|pos| {
            let key = format!("{:.6}_{:.6}", pos.lat, pos.lon);
            let next_id = tables.locations.len() as u64 + 1;
            *location_ids.entry(key).or_insert_with(|| {
                tables.locations.push(LocationRow {
                    id: next_id,
                    lat: pos.lat,
                    lon: pos.lon,
                });
                next_id
            })
        });

        let descriptor = row.size_descriptor.as_deref();
        tables.units.push(UnitRow {
            id: unit_id,
            name: row
                .name
                .clone()
                .unwrap_or_else(|| format!("Empresa {}", unit_id)),
            size_descriptor: row.size_descriptor.clone(),
            employee_count: employee_upper_bound(descriptor),
            size_category: classify_size_descriptor(descriptor),
            sector_id,
            municipality_id,
            location_id,
        });
    }

    info!(
        "Normalized {} units: {} sectors, {} municipalities, {} locations",
        tables.units.len(),
        tables.sectors.len(),
        tables.municipalities.len(),
        tables.locations.len()
    );

    tables
}

impl NormalizedTables {
    /// Reconstruct flat business records, one per unit, in unit order.
    ///
    /// Dangling foreign keys read as missing values.
    pub fn join(&self) -> Vec<BusinessRecord> {
        let sectors: HashMap<u64, &SectorRow> = self.sectors.iter().map(|s| (s.id, s)).collect();
        let municipalities: HashMap<u64, &MunicipalityRow> =
            self.municipalities.iter().map(|m| (m.id, m)).collect();
        let locations: HashMap<u64, &LocationRow> =
            self.locations.iter().map(|l| (l.id, l)).collect();

        self.units
            .iter()
            .map(|unit| {
                let sector = unit.sector_id.and_then(|id| sectors.get(&id));
                let municipality = unit.municipality_id.and_then(|id| municipalities.get(&id));
                let location = unit.location_id.and_then(|id| locations.get(&id));

                BusinessRecord {
                    id: unit.id,
                    name: unit.name.clone(),
                    size_category: unit.size_category,
                    size_descriptor: unit.size_descriptor.clone(),
                    employee_count: unit.employee_count,
                    municipality: municipality.and_then(|m| m.name.clone()),
                    state: municipality.and_then(|m| m.state.clone()),
                    sector_name: sector.and_then(|s| s.name.clone()),
                    position: location.map(|l| Position::new(l.lat, l.lon)),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SizeCategory;

    fn row(name: &str, sector: &str, municipality: &str, pos: Option<(f64, f64)>) -> SheetRow {
        SheetRow {
            name: Some(name.to_string()),
            sector_code: Some(format!("code-{}", sector)),
            sector_name: Some(sector.to_string()),
            size_descriptor: Some("6 a 10 personas".to_string()),
            municipality: Some(municipality.to_string()),
            state: Some("Jalisco".to_string()),
            latitude: pos.map(|p| p.0),
            longitude: pos.map(|p| p.1),
        }
    }

    #[test]
    fn test_normalize_deduplicates() {
        let rows = vec![
            row("A", "Comercio", "Guadalajara", Some((20.67, -103.35))),
            row("B", "Comercio", "Zapopan", Some((20.67, -103.35))),
            row("C", "Manufactura", "Guadalajara", None),
        ];
        let tables = normalize(&rows);

        assert_eq!(tables.units.len(), 3);
        assert_eq!(tables.sectors.len(), 2);
        assert_eq!(tables.municipalities.len(), 2);
        assert_eq!(tables.locations.len(), 1);

        assert_eq!(tables.units[0].sector_id, Some(1));
        assert_eq!(tables.units[1].sector_id, Some(1));
        assert_eq!(tables.units[2].sector_id, Some(2));
        assert_eq!(tables.units[2].municipality_id, Some(1));
        assert_eq!(tables.units[2].location_id, None);
        assert_eq!(tables.units[0].size_category, SizeCategory::Micro);
        assert_eq!(tables.units[0].employee_count, Some(10));
    }

    #[test]
    fn test_missing_name_gets_placeholder() {
        let rows = vec![SheetRow::default()];
        let tables = normalize(&rows);
        assert_eq!(tables.units[0].name, "Empresa 1");
        assert_eq!(tables.units[0].size_category, SizeCategory::Unknown);
        assert_eq!(tables.units[0].sector_id, None);
        assert_eq!(tables.units[0].municipality_id, None);
    }

    #[test]
    fn test_join_restores_records() {
        let rows = vec![
            row("A", "Comercio", "Guadalajara", Some((20.67, -103.35))),
            row("B", "Servicios", "Zapopan", None),
        ];
        let records = normalize(&rows).join();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[0].sector_name.as_deref(), Some("Comercio"));
        assert_eq!(records[0].municipality.as_deref(), Some("Guadalajara"));
        assert_eq!(records[0].state.as_deref(), Some("Jalisco"));
        assert_eq!(records[0].position, Some(Position::new(20.67, -103.35)));
        assert_eq!(records[1].position, None);
        assert_eq!(records[1].sector_name.as_deref(), Some("Servicios"));
    }
}
