//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting values outside the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    /// `"lat,lng"` as expected by the places API `location` parameter.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// Great-circle distance between two points in kilometres (haversine).
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).expect("valid coordinates")
    }

    #[test]
    fn same_point_is_zero_km() {
        let p = point(25.033, 121.5654);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn known_pair_on_equator() {
        // 0.05 degrees of longitude on the equator is ~5.56 km.
        let d = haversine_km(point(0.0, 0.0), point(0.0, 0.05));
        assert!((5.5..5.6).contains(&d), "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = point(51.5007, -0.1246);
        let b = point(40.6892, -74.0445);
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
        // London to New York is roughly 5 570 km.
        assert!((5500.0..5650.0).contains(&ab), "got {ab}");
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(Coordinates::new(91.0, 0.0).is_none());
        assert!(Coordinates::new(0.0, -181.0).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn query_value_is_comma_joined() {
        assert_eq!(point(1.5, -2.25).to_query_value(), "1.5,-2.25");
    }
}
