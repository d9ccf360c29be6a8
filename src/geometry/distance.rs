use crate::models::Position;

/// Mean Earth radius used for all great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km between two lat/lon points (haversine).
///
/// Defined for any finite input; latitudes beyond ±90° give meaningless
/// but finite results.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// [`haversine_distance_km`] between two positions
pub fn distance_between(a: Position, b: Position) -> f64 {
    haversine_distance_km(a.lat, a.lon, b.lat, b.lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_POINTS: &[(f64, f64)] = &[
        (19.4326, -99.1332), // Mexico City
        (20.6597, -103.3496), // Guadalajara
        (25.6866, -100.3161), // Monterrey
        (19.4, -99.1),
        (0.0, 0.0),
        (-33.8688, 151.2093),
        (89.9, 45.0),
        (-45.0, 179.9),
        (-45.0, -179.9),
    ];

    #[test]
    fn test_zero_for_identical_points() {
        for &(lat, lon) in SAMPLE_POINTS {
            assert_eq!(haversine_distance_km(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        for &(lat1, lon1) in SAMPLE_POINTS {
            for &(lat2, lon2) in SAMPLE_POINTS {
                let ab = haversine_distance_km(lat1, lon1, lat2, lon2);
                let ba = haversine_distance_km(lat2, lon2, lat1, lon1);
                assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
            }
        }
    }

    #[test]
    fn test_triangle_inequality() {
        for &a in SAMPLE_POINTS {
            for &b in SAMPLE_POINTS {
                for &c in SAMPLE_POINTS {
                    let ac = haversine_distance_km(a.0, a.1, c.0, c.1);
                    let ab = haversine_distance_km(a.0, a.1, b.0, b.1);
                    let bc = haversine_distance_km(b.0, b.1, c.0, c.1);
                    assert!(ac <= ab + bc + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_known_distances() {
        // One degree of longitude on the equator
        let d = haversine_distance_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.195).abs() < 0.01, "got {}", d);

        // Mexico City to Guadalajara is roughly 460 km
        let d = haversine_distance_km(19.4326, -99.1332, 20.6597, -103.3496);
        assert!((d - 461.0).abs() < 5.0, "got {}", d);

        // Crossing the antimeridian stays short
        let d = haversine_distance_km(-45.0, 179.9, -45.0, -179.9);
        assert!(d < 20.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = haversine_distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
