//! Polygonal approximation of a circle for drawing on the map.

use std::f64::consts::PI;

use super::KM_PER_DEGREE;

pub const DEFAULT_CIRCLE_SEGMENTS: usize = 36;

/// Largest outline resolution accepted from callers
pub const MAX_CIRCLE_SEGMENTS: usize = 3600;

/// Description of a circle outline; iterate it to get `(lon, lat)` points.
///
/// Copyable, so the same outline can be walked any number of times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleBoundary {
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
    segments: usize,
}

/// Outline of the circle around `(center_lat, center_lon)` with `segments`
/// equal angular steps plus a closing point equal to the first.
///
/// Uses a flat km-to-degree conversion that breaks down near the poles;
/// callers must not pass polar centers. `segments == 0` falls back to
/// [`DEFAULT_CIRCLE_SEGMENTS`].
pub fn circle_boundary_points(
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
    segments: usize,
) -> CircleBoundary {
    CircleBoundary {
        center_lat,
        center_lon,
        radius_km,
        segments: if segments == 0 {
            DEFAULT_CIRCLE_SEGMENTS
        } else {
            segments
        },
    }
}

impl CircleBoundary {
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Number of points produced, closing point included
    pub fn len(&self) -> usize {
        self.segments.saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> CirclePoints {
        CirclePoints {
            boundary: *self,
            next: 0,
        }
    }

    fn point_at(&self, step: usize) -> (f64, f64) {
        // The last step reuses the first angle so the ring closes exactly
        let step = if step == self.segments { 0 } else { step };
        let angle = 2.0 * PI * step as f64 / self.segments as f64;

        let dlat = (self.radius_km / KM_PER_DEGREE) * angle.cos();
        let dlon =
            (self.radius_km / (KM_PER_DEGREE * self.center_lat.to_radians().cos())) * angle.sin();

        (self.center_lon + dlon, self.center_lat + dlat)
    }
}

impl IntoIterator for CircleBoundary {
    type Item = (f64, f64);
    type IntoIter = CirclePoints;

    fn into_iter(self) -> CirclePoints {
        self.iter()
    }
}

impl IntoIterator for &CircleBoundary {
    type Item = (f64, f64);
    type IntoIter = CirclePoints;

    fn into_iter(self) -> CirclePoints {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct CirclePoints {
    boundary: CircleBoundary,
    next: usize,
}

impl Iterator for CirclePoints {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.boundary.len() {
            return None;
        }
        let point = self.boundary.point_at(self.next);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.boundary.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CirclePoints {}

/// Area of a circle in km²; zero for non-positive radii
pub fn circle_area_km2(radius_km: f64) -> f64 {
    if radius_km > 0.0 {
        PI * radius_km * radius_km
    } else {
        0.0
    }
}
