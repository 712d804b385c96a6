use super::distance::haversine;
use super::point::{GeoPoint, MapLocatable};

/// A displayable cluster of located values
///
/// Immutable once built; each recompute publishes a fresh list instead of
/// mutating previous clusters.
#[derive(Debug, Clone)]
pub struct MapCluster<T> {
    /// Cluster ID, unique within one clustering result
    pub id: usize,
    /// Values grouped into this cluster, never empty
    pub members: Vec<T>,
    /// Midpoint of the members' bounding box
    pub center: GeoPoint,
    /// Ground distance between the bounding box corners, in meters
    pub radius: f64,
}

/// Builds a cluster record from its member values
///
/// The center is the midpoint of the min/max latitudes and longitudes, not
/// the centroid, and the radius is the haversine distance between the
/// bounding box's south-west and north-east corners rather than a true
/// enclosing-circle radius. Skewed member distributions bias both toward
/// the bounding extremes. Single-member and all-coincident sets produce a
/// zero radius.
///
/// # Panics
///
/// Panics if `members` is empty
pub fn aggregate<T: MapLocatable>(id: usize, members: Vec<T>) -> MapCluster<T> {
    assert!(!members.is_empty(), "empty cluster");

    let mut min = GeoPoint::new(90.0, 180.0);
    let mut max = GeoPoint::new(-90.0, -180.0);

    for member in &members {
        let p = member.location();

        if p.latitude < min.latitude {
            min.latitude = p.latitude;
        }
        if p.latitude > max.latitude {
            max.latitude = p.latitude;
        }
        if p.longitude < min.longitude {
            min.longitude = p.longitude;
        }
        if p.longitude > max.longitude {
            max.longitude = p.longitude;
        }
    }

    let center = GeoPoint::new(
        (min.latitude + max.latitude) / 2.0,
        (min.longitude + max.longitude) / 2.0,
    );
    let radius = haversine(min, max);

    MapCluster {
        id,
        members,
        center,
        radius,
    }
}
