use std::f64::consts::PI;

use thiserror::Error;

use super::point::{GeoPoint, MapLocatable};

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// An error produced by a distance callback
///
/// A failed distance aborts the in-progress clustering pass with no partial
/// result; the previously published cluster list stays visible.
#[derive(Debug, Error)]
pub enum DistanceError {
    /// A coordinate contained a NaN or infinite component
    #[error("coordinate ({latitude}, {longitude}) is not finite")]
    NonFiniteCoordinate { latitude: f64, longitude: f64 },
    /// The computed distance was NaN or infinite
    #[error("distance is not finite (got {got})")]
    NonFiniteDistance { got: f64 },
}

/// Calculates the great-circle (haversine) distance between two coordinates
///
/// # Returns
///
/// Ground distance in meters
pub fn haversine(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude * DEGREE_RAD;
    let lat_b = b.latitude * DEGREE_RAD;
    let d_lat = (b.latitude - a.latitude) * DEGREE_RAD;
    let d_lon = (b.longitude - a.longitude) * DEGREE_RAD;

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Checked geodesic metric over located values
///
/// This is the default distance callback for the clustering engine: it
/// rejects non-finite coordinates up front and verifies the result, so a
/// bad value aborts the pass instead of silently skewing neighborhoods.
pub fn geo_metric<T: MapLocatable>(a: &T, b: &T) -> Result<f64, DistanceError> {
    let pa = a.location();
    let pb = b.location();

    for p in [pa, pb] {
        if !p.is_finite() {
            return Err(DistanceError::NonFiniteCoordinate {
                latitude: p.latitude,
                longitude: p.longitude,
            });
        }
    }

    let d = haversine(pa, pb);
    if !d.is_finite() {
        return Err(DistanceError::NonFiniteDistance { got: d });
    }
    Ok(d)
}
