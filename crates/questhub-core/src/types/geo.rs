//! Geographic helpers for check-in quests and map listings.

use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG) in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Whether `other` lies within `radius_m` metres of this point.
    pub fn within(&self, other: &GeoPoint, radius_m: f64) -> bool {
        self.distance_m(other) <= radius_m
    }
}

/// Build a point from optional columns, as stored on shops and quests.
pub fn point_from(latitude: Option<f64>, longitude: Option<f64>) -> Option<GeoPoint> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -181.0).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::new(13.75, 100.5).is_some());
    }

    #[test]
    fn test_distance_bangkok_to_chiang_mai() {
        // Grand Palace to Tha Phae Gate, roughly 585 km.
        let bangkok = GeoPoint::new(13.7500, 100.4913).unwrap();
        let chiang_mai = GeoPoint::new(18.7877, 98.9931).unwrap();
        let km = bangkok.distance_m(&chiang_mai) / 1000.0;
        assert!((575.0..595.0).contains(&km), "got {km}");
    }

    #[test]
    fn test_within_radius() {
        let centre = GeoPoint::new(7.8804, 98.3923).unwrap();
        // About 111 m north.
        let near = GeoPoint::new(7.8814, 98.3923).unwrap();
        assert!(centre.within(&near, 150.0));
        assert!(!centre.within(&near, 100.0));
        assert_eq!(centre.distance_m(&centre), 0.0);
    }

    #[test]
    fn test_point_from_requires_both() {
        assert!(point_from(Some(13.0), None).is_none());
        assert!(point_from(Some(13.0), Some(100.0)).is_some());
    }
}
