use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the Haversine formula (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinate in decimal degrees.
///
/// On the wire a coordinate is a `[lat, lng]` pair, matching how map
/// libraries hand them around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate from nullable columns. Either half missing means
    /// the position is not known yet.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(*self, *other)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lng]
    }
}

/// Great-circle distance between two points on a spherical Earth (km).
///
/// This is straight-line spherical distance, not road distance.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate::new(-15.786, 35.005);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn one_degree_on_equator() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-9, "got {d}, expected {expected}");
    }

    #[test]
    fn symmetric() {
        let a = Coordinate::new(-15.786, 35.005);
        let b = Coordinate::new(-13.962, 33.774);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn validity_bounds() {
        assert!(Coordinate::new(-15.7, 35.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
        assert_eq!(Coordinate::from_parts(Some(1.0), None), None);
    }

    #[test]
    fn serializes_as_pair() {
        let c = Coordinate::new(-15.5, 35.25);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[-15.5,35.25]");
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
