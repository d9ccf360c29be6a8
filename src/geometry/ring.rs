//! Polygon rings over lon/lat treated as a flat plane.
//!
//! Containment is planar: longitude and latitude are used directly as x/y,
//! which holds up for selections of a few tens of km.
//!
//! Points on an edge or vertex are outside the ring. Filtering and the
//! drawn outline both come from the same validated polygon.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Contains, Coord, Line, LineString, Point, Polygon};

use super::KM_PER_DEGREE;
use crate::error::RegionError;

/// Validate a `(lon, lat)` ring and build the polygon used for containment.
///
/// Consecutive duplicate vertices and an explicit closing vertex are
/// dropped. The remaining ring needs at least 3 distinct vertices, a
/// non-zero area, and no crossing or overlapping edges.
pub fn validate_ring(vertices: &[(f64, f64)]) -> Result<Polygon<f64>, RegionError> {
    if vertices
        .iter()
        .any(|(lon, lat)| !lon.is_finite() || !lat.is_finite())
    {
        return Err(RegionError::invalid("polygon has non-finite coordinates"));
    }

    let mut ring = distinct_ring(vertices);
    if ring.len() < 3 {
        return Err(RegionError::invalid(format!(
            "polygon needs at least 3 distinct vertices, got {}",
            ring.len()
        )));
    }

    check_simple(&ring)?;

    ring.push(ring[0]);
    let polygon = Polygon::new(LineString::new(ring), vec![]);

    if polygon.unsigned_area() <= 0.0 {
        return Err(RegionError::invalid("polygon has zero area"));
    }

    Ok(polygon)
}

/// Ring vertices with consecutive duplicates and the closing vertex removed.
fn distinct_ring(vertices: &[(f64, f64)]) -> Vec<Coord<f64>> {
    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(vertices.len() + 1);
    for &(x, y) in vertices {
        let c = Coord { x, y };
        if ring.last() != Some(&c) {
            ring.push(c);
        }
    }
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Number of vertices [`validate_ring`] works with after dropping repeats.
pub fn distinct_vertex_count(vertices: &[(f64, f64)]) -> usize {
    distinct_ring(vertices).len()
}

/// Reject rings whose edges cross, touch, or run along each other.
fn check_simple(ring: &[Coord<f64>]) -> Result<(), RegionError> {
    let n = ring.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(ring[i], ring[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                // Neighbouring edges always share their common vertex
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::Collinear { .. }) => {
                    return Err(RegionError::invalid(format!(
                        "polygon edges {} and {} overlap",
                        i, j
                    )));
                }
                Some(LineIntersection::SinglePoint { .. }) => {
                    return Err(RegionError::invalid(format!(
                        "polygon is self-intersecting (edges {} and {})",
                        i, j
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Whether `(lon, lat)` lies strictly inside an already validated polygon.
pub fn polygon_contains(polygon: &Polygon<f64>, lon: f64, lat: f64) -> bool {
    polygon.contains(&Point::new(lon, lat))
}

/// Planar point-in-polygon test for a `(lon, lat)` point.
///
/// Fails for rings that [`validate_ring`] rejects rather than answering false.
pub fn point_in_polygon(point: (f64, f64), vertices: &[(f64, f64)]) -> Result<bool, RegionError> {
    let polygon = validate_ring(vertices)?;
    Ok(polygon_contains(&polygon, point.0, point.1))
}

/// Closed axis-aligned square ring of `side_km` centered on a point.
///
/// Vertex order: SW, SE, NE, NW, SW.
pub fn square_ring(center_lat: f64, center_lon: f64, side_km: f64) -> Vec<(f64, f64)> {
    let half = side_km / 2.0;
    let dlat = half / KM_PER_DEGREE;
    let dlon = half / (KM_PER_DEGREE * center_lat.to_radians().cos());

    let (min_lon, max_lon) = (center_lon - dlon, center_lon + dlon);
    let (min_lat, max_lat) = (center_lat - dlat, center_lat + dlat);

    vec![
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
        (min_lon, min_lat),
    ]
}

/// Approximate ring area in km², using an equirectangular projection
/// around the ring's mean latitude.
pub fn ring_area_km2(vertices: &[(f64, f64)]) -> Result<f64, RegionError> {
    let polygon = validate_ring(vertices)?;
    Ok(polygon_area_km2(&polygon))
}

/// [`ring_area_km2`] for a polygon that is already validated.
pub fn polygon_area_km2(polygon: &Polygon<f64>) -> f64 {
    let coords = &polygon.exterior().0;
    // The closing coordinate repeats the first one
    let open = &coords[..coords.len().saturating_sub(1)];
    if open.is_empty() {
        return 0.0;
    }

    let mean_lat = open.iter().map(|c| c.y).sum::<f64>() / open.len() as f64;
    let lon_scale = KM_PER_DEGREE * mean_lat.to_radians().cos();

    let projected: Vec<Coord<f64>> = coords
        .iter()
        .map(|c| Coord {
            x: c.x * lon_scale,
            y: c.y * KM_PER_DEGREE,
        })
        .collect();

    Polygon::new(LineString::new(projected), vec![]).unsigned_area()
}
