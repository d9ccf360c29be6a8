//! Linear region filters over a dataset.
//!
//! These define membership; [`super::RegionIndex`] must agree with them.
//! Records without a position are never inside any region.

use crate::error::RegionError;
use crate::geometry::{
    distinct_vertex_count, haversine_distance_km, polygon_contains, validate_ring,
};
use crate::models::{BusinessRecord, Position, RegionDescriptor};

/// Records strictly inside the `(lon, lat)` ring, in input order.
///
/// A ring with fewer than 3 distinct vertices selects nothing. A ring that
/// has enough vertices but is malformed (crossing edges, zero area,
/// non-finite values) is an error.
pub fn filter_by_polygon<'a, I>(
    dataset: I,
    vertices: &[(f64, f64)],
) -> Result<Vec<&'a BusinessRecord>, RegionError>
where
    I: IntoIterator<Item = &'a BusinessRecord>,
{
    if distinct_vertex_count(vertices) < 3 {
        return Ok(Vec::new());
    }
    let polygon = validate_ring(vertices)?;

    Ok(dataset
        .into_iter()
        .filter(|record| {
            record
                .position
                .is_some_and(|pos| polygon_contains(&polygon, pos.lon, pos.lat))
        })
        .collect())
}

/// Records within `radius_km` of the center (boundary inclusive), in input order.
///
/// A radius that is not a positive number matches nothing.
pub fn filter_by_circle<'a, I>(
    dataset: I,
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
) -> Vec<&'a BusinessRecord>
where
    I: IntoIterator<Item = &'a BusinessRecord>,
{
    if radius_km.is_nan() || radius_km <= 0.0 {
        return Vec::new();
    }

    dataset
        .into_iter()
        .filter(|record| {
            record
                .position
                .is_some_and(|pos| within_radius(center_lat, center_lon, radius_km, pos))
        })
        .collect()
}

/// Dispatch on the descriptor shape.
pub fn filter_by_region<'a, I>(
    dataset: I,
    region: &RegionDescriptor,
) -> Result<Vec<&'a BusinessRecord>, RegionError>
where
    I: IntoIterator<Item = &'a BusinessRecord>,
{
    match region {
        RegionDescriptor::Polygon { vertices } => filter_by_polygon(dataset, vertices),
        RegionDescriptor::Circle { center, radius_km } => Ok(filter_by_circle(
            dataset,
            center.lat,
            center.lon,
            *radius_km,
        )),
    }
}

pub(crate) fn within_radius(center_lat: f64, center_lon: f64, radius_km: f64, pos: Position) -> bool {
    haversine_distance_km(center_lat, center_lon, pos.lat, pos.lon) <= radius_km
}
