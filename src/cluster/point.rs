//! Geographic primitives shared by the clustering modules

/// A geographic coordinate in degrees
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`;
/// the distance callbacks reject non-finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a coordinate from latitude and longitude in degrees
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A domain value that exposes a map location
///
/// The clustering pipeline only reads the location; values are owned by the
/// caller and never mutated.
pub trait MapLocatable {
    /// Returns the value's coordinate on the map
    fn location(&self) -> GeoPoint;
}

impl MapLocatable for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}
