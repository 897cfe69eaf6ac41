use num_traits::Float;
use serde::{Deserialize, Serialize};


/// Mean earth radius used by the great-circle distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Euclidean distance
pub fn euclidean<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Float,
    {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}


/// Geographic position in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Straight-line distance measured in degree space
    pub fn planar_distance(&self, other: &LatLon) -> f64 {
        euclidean(self.lat, self.lon, other.lat, other.lon)
    }

    /// Great-circle distance in kilometers
    /// https://en.wikipedia.org/wiki/Haversine_formula
    pub fn haversine_km(&self, other: &LatLon) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}
