//! Geometry primitives for region selection.
//!
//! Planar point-in-polygon containment, haversine distance, and circle
//! outlines for rendering.

mod circle;
mod distance;
mod ring;

pub use circle::{
    circle_area_km2, circle_boundary_points, CircleBoundary, CirclePoints,
    DEFAULT_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS,
};
pub use distance::{distance_between, haversine_distance_km, EARTH_RADIUS_KM};
pub use ring::{
    distinct_vertex_count, point_in_polygon, polygon_area_km2, polygon_contains, ring_area_km2,
    square_ring, validate_ring,
};

/// Kilometres per degree of latitude used for flat degree conversions
pub const KM_PER_DEGREE: f64 = 111.32;
