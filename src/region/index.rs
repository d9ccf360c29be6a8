//! R-tree over business positions for fast region lookups.

use geo::{BoundingRect, Polygon};
use rstar::{RTree, RTreeObject, AABB};
use std::f64::consts::FRAC_PI_2;
use tracing::info;

use super::filter::within_radius;
use crate::error::RegionError;
use crate::geometry::{distinct_vertex_count, polygon_contains, validate_ring, EARTH_RADIUS_KM};
use crate::models::{BusinessRecord, RegionDescriptor};

/// Slack added to search envelopes, in degrees
const ENVELOPE_PAD_DEG: f64 = 1e-7;

/// Position of one record, for R-tree indexing
#[derive(Debug, Clone, Copy)]
struct IndexedPosition {
    slot: usize,
    point: [f64; 2],
}

impl RTreeObject for IndexedPosition {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// Business records plus a spatial index over their positions.
///
/// Lookups return exactly what the linear filters in [`super::filter`]
/// return, in dataset order.
pub struct RegionIndex {
    records: Vec<BusinessRecord>,
    tree: RTree<IndexedPosition>,
    /// Positions outside the normal lat/lon range; always tested directly
    outliers: Vec<usize>,
}

impl RegionIndex {
    pub fn build(records: Vec<BusinessRecord>) -> Self {
        info!("Building spatial index for {} records...", records.len());

        let mut indexed = Vec::new();
        let mut outliers = Vec::new();
        let mut unlocated = 0usize;

        for (slot, record) in records.iter().enumerate() {
            match record.position {
                Some(pos) if pos.lat.abs() <= 90.0 && pos.lon.abs() <= 180.0 => {
                    indexed.push(IndexedPosition {
                        slot,
                        point: [pos.lon, pos.lat],
                    });
                }
                Some(_) => outliers.push(slot),
                None => unlocated += 1,
            }
        }

        let tree = RTree::bulk_load(indexed);

        info!(
            "Spatial index built with {} entries ({} out of range, {} without position)",
            tree.size(),
            outliers.len(),
            unlocated
        );

        Self {
            records,
            tree,
            outliers,
        }
    }

    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }

    /// Number of records with an indexed position
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Records inside `region`, in dataset order.
    ///
    /// Matches [`super::filter_by_region`] exactly, degenerate rings included.
    pub fn filter(&self, region: &RegionDescriptor) -> Result<Vec<&BusinessRecord>, RegionError> {
        match region {
            RegionDescriptor::Polygon { vertices } => {
                if distinct_vertex_count(vertices) < 3 {
                    return Ok(Vec::new());
                }
                Ok(self.within_polygon(&validate_ring(vertices)?))
            }
            RegionDescriptor::Circle { center, radius_km } => {
                Ok(self.within_circle(center.lat, center.lon, *radius_km))
            }
        }
    }

    /// Records strictly inside an already validated polygon.
    pub fn within_polygon(&self, polygon: &Polygon<f64>) -> Vec<&BusinessRecord> {
        let Some(rect) = polygon.bounding_rect() else {
            return Vec::new();
        };
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let inside = |slot: usize| {
            self.records[slot]
                .position
                .is_some_and(|pos| polygon_contains(polygon, pos.lon, pos.lat))
        };

        self.resolve(self.collect_slots(Some(envelope), inside))
    }

    /// Records within `radius_km` of the center; empty for a radius that
    /// is not a positive number.
    pub fn within_circle(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Vec<&BusinessRecord> {
        if radius_km.is_nan() || radius_km <= 0.0 {
            return Vec::new();
        }

        let inside = |slot: usize| {
            self.records[slot]
                .position
                .is_some_and(|pos| within_radius(center_lat, center_lon, radius_km, pos))
        };

        let envelope = circle_envelope(center_lat, center_lon, radius_km);
        self.resolve(self.collect_slots(envelope, inside))
    }

    fn resolve(&self, slots: Vec<usize>) -> Vec<&BusinessRecord> {
        slots.into_iter().map(|slot| &self.records[slot]).collect()
    }

    /// Candidate slots from the envelope (or every record when there is
    /// none), narrowed by `inside`, sorted back into dataset order.
    fn collect_slots<F>(&self, envelope: Option<AABB<[f64; 2]>>, inside: F) -> Vec<usize>
    where
        F: Fn(usize) -> bool,
    {
        let mut slots: Vec<usize> = match envelope {
            Some(envelope) => self
                .tree
                .locate_in_envelope_intersecting(&envelope)
                .map(|ip| ip.slot)
                .chain(self.outliers.iter().copied())
                .filter(|&slot| inside(slot))
                .collect(),
            None => (0..self.records.len()).filter(|&slot| inside(slot)).collect(),
        };
        slots.sort_unstable();
        slots
    }
}

/// Lon/lat box guaranteed to contain every in-range point within
/// `radius_km` of the center. `None` when no useful box exists (polar
/// caps, antimeridian crossings, out-of-range centers).
fn circle_envelope(center_lat: f64, center_lon: f64, radius_km: f64) -> Option<AABB<[f64; 2]>> {
    if !center_lat.is_finite() || !center_lon.is_finite() || !radius_km.is_finite() {
        return None;
    }
    if center_lat.abs() > 90.0 || center_lon.abs() > 180.0 {
        return None;
    }

    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_rad = center_lat.to_radians();
    if angular >= FRAC_PI_2 - lat_rad.abs() {
        return None;
    }

    let dlat = angular.to_degrees() + ENVELOPE_PAD_DEG;
    let dlon = (angular.sin() / lat_rad.cos()).asin().to_degrees() + ENVELOPE_PAD_DEG;

    let (min_lon, max_lon) = (center_lon - dlon, center_lon + dlon);
    if min_lon < -180.0 || max_lon > 180.0 {
        return None;
    }

    Some(AABB::from_corners(
        [min_lon, center_lat - dlat],
        [max_lon, center_lat + dlat],
    ))
}
