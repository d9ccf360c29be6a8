//! Region descriptors supplied by the map consumer.

use serde::{Deserialize, Serialize};

use super::Position;
use crate::error::RegionError;
use crate::geometry;

/// A user-selected region on the map.
///
/// Polygon vertices are `(lon, lat)` pairs; the ring is implicitly closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegionDescriptor {
    Polygon { vertices: Vec<(f64, f64)> },
    Circle { center: Position, radius_km: f64 },
}

impl RegionDescriptor {
    /// Polygon region; fails on degenerate or self-intersecting rings.
    pub fn polygon(vertices: Vec<(f64, f64)>) -> Result<Self, RegionError> {
        geometry::validate_ring(&vertices)?;
        Ok(RegionDescriptor::Polygon { vertices })
    }

    /// Circle region; the radius must be a positive, finite number of km.
    pub fn circle(center: Position, radius_km: f64) -> Result<Self, RegionError> {
        check_center(center)?;
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(RegionError::invalid(format!(
                "circle radius must be > 0 km, got {}",
                radius_km
            )));
        }
        Ok(RegionDescriptor::Circle { center, radius_km })
    }

    /// Axis-aligned square of `side_km` centered on `center`.
    pub fn square(center: Position, side_km: f64) -> Result<Self, RegionError> {
        check_center(center)?;
        if !(side_km.is_finite() && side_km > 0.0) {
            return Err(RegionError::invalid(format!(
                "square side must be > 0 km, got {}",
                side_km
            )));
        }
        Self::polygon(geometry::square_ring(center.lat, center.lon, side_km))
    }

    /// Re-check a descriptor that arrived without going through a constructor
    /// (e.g. deserialized from a request body).
    pub fn validate(&self) -> Result<(), RegionError> {
        match self {
            RegionDescriptor::Polygon { vertices } => geometry::validate_ring(vertices).map(|_| ()),
            RegionDescriptor::Circle { center, radius_km } => {
                Self::circle(*center, *radius_km).map(|_| ())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RegionDescriptor::Polygon { .. } => "polygon",
            RegionDescriptor::Circle { .. } => "circle",
        }
    }
}

fn check_center(center: Position) -> Result<(), RegionError> {
    if center.lat.is_finite() && center.lon.is_finite() {
        Ok(())
    } else {
        Err(RegionError::invalid("center coordinates must be finite"))
    }
}
