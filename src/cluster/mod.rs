//! Density-based clustering of map locations on (lat, lon)
pub mod dbscan;
pub mod distance;
pub mod geometry;
pub mod point;
pub mod threshold;

#[cfg(test)]
mod threshold_test;

pub use dbscan::{Cluster, ClusterError, db_scan, neighbors};
pub use distance::{DEGREE_RAD, DistanceError, EARTH_RADIUS_M, geo_metric, haversine};
pub use geometry::{MapCluster, aggregate};
pub use point::{GeoPoint, MapLocatable};
pub use threshold::{DEFAULT_SPAN_FACTOR, Region, Span, span_distance, threshold};
