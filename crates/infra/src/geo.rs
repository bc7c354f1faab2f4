//! Spherical distance helpers.

use serde_json::Value;

/// Mean Earth radius used to turn miles into an angular radius.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Read a GeoJSON `[longitude, latitude]` pair.
    pub fn from_coordinates(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        match pair.as_slice() {
            [lng, lat] => Some(Self::new(lng.as_f64()?, lat.as_f64()?)),
            _ => None,
        }
    }

    /// Great-circle distance to `other`, in radians (haversine).
    pub fn angular_distance(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();
        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }
}

/// Angular radius of a spherical cap `miles` wide on Earth's surface.
pub fn miles_to_radians(miles: f64) -> f64 {
    miles / EARTH_RADIUS_MILES
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boston_to_providence_is_about_41_miles() {
        let boston = GeoPoint::new(-71.0589, 42.3601);
        let providence = GeoPoint::new(-71.4128, 41.8240);
        let miles = boston.angular_distance(&providence) * EARTH_RADIUS_MILES;
        assert!((miles - 41.0).abs() < 1.5, "got {miles}");
    }

    #[test]
    fn reads_geojson_pairs() {
        assert_eq!(GeoPoint::from_coordinates(&json!([-71.1, 42.3])), Some(GeoPoint::new(-71.1, 42.3)));
        assert_eq!(GeoPoint::from_coordinates(&json!([1.0])), None);
    }

    #[test]
    fn converts_miles() {
        assert_eq!(miles_to_radians(EARTH_RADIUS_MILES), 1.0);
    }
}
