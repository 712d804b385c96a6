use bitvec::prelude::*;
use thiserror::Error;
use tracing::trace;

use super::distance::DistanceError;

// DBSCAN algorithm pseudocode (from <http://en.wikipedia.org/wiki/DBSCAN>):
//
// DBSCAN(D, eps, MinPts)
//    C = 0
//    for each unlabeled point P in dataset D
//       NeighborPts = all points within distance eps of P (including P)
//       if sizeof(NeighborPts) >= MinPts
//          label P with C, then expand: label every reachable unlabeled
//          neighbor with C, growing the frontier through neighbors that
//          are themselves dense enough
//          C = next cluster
//    points never labeled are noise
//
// This variant keeps the labels in an arena indexed by input position, so
// values stay untouched and a point provisionally below the density
// threshold can still be absorbed by a later-expanded cluster.

/// Cluster found by one clustering pass
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Cluster ID, assigned in discovery order starting at 0
    pub id: usize,
    /// Indices of the input values belonging to this cluster
    pub points: Vec<usize>,
}

/// An error produced by the clustering engine
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Epsilon must be a finite, non-negative distance
    #[error("epsilon must be finite and non-negative (got {got})")]
    InvalidEpsilon { got: f64 },
    /// At least the point itself is required in a neighborhood
    #[error("min_points must be at least 1 (got {got})")]
    InvalidMinPoints { got: usize },
    /// The distance callback failed; no partial result is produced
    #[error("distance computation failed")]
    Metric(#[from] DistanceError),
}

/// Clusters values using the DBSCAN algorithm
///
/// # Arguments
///
/// * `values` - Values to cluster; the pass only reads them
/// * `eps` - Neighbor-inclusion radius, in the metric's unit (meters for
///   [`geo_metric`](super::distance::geo_metric))
/// * `min_points` - Minimum neighborhood size (the point itself counts)
///   for a point to seed or extend a cluster
/// * `distance` - Metric callback; must be symmetric and non-negative
///
/// # Returns
///
/// A tuple `(clusters, outliers)` where:
/// - `clusters` holds the found clusters, ids in discovery order
/// - `outliers` holds indices of values left outside every cluster
///
/// Every input index lands in exactly one cluster or in the outliers.
/// With `min_points == 1` and `eps > 0` every point seeds its own cluster
/// when nothing pulls it in, so the outlier list is empty.
pub fn db_scan<T, F>(
    values: &[T],
    eps: f64,
    min_points: usize,
    mut distance: F,
) -> Result<(Vec<Cluster>, Vec<usize>), ClusterError>
where
    F: FnMut(&T, &T) -> Result<f64, DistanceError>,
{
    if !eps.is_finite() || eps < 0.0 {
        return Err(ClusterError::InvalidEpsilon { got: eps });
    }
    if min_points == 0 {
        return Err(ClusterError::InvalidMinPoints { got: min_points });
    }

    let mut labels: Vec<Option<usize>> = vec![None; values.len()];
    let mut clusters: Vec<Cluster> = Vec::new();

    let mut in_frontier = bitvec![0; values.len()];

    for i in 0..values.len() {
        if labels[i].is_some() {
            continue;
        }

        let seeds = neighbors(values, i, eps, &mut distance)?;
        if seeds.len() < min_points {
            // Not dense enough to seed; may still be reached from a core
            // point later, or end up an outlier.
            continue;
        }

        let id = clusters.len();
        labels[i] = Some(id);
        let mut members = vec![i];

        in_frontier.fill(false);
        for &j in &seeds {
            in_frontier.set(j, true);
        }

        let mut frontier = seeds;
        let mut next = 0;
        // The frontier grows while we walk it, so index instead of iterate
        while next < frontier.len() {
            let k = frontier[next];
            next += 1;
            if labels[k].is_some() {
                continue;
            }
            labels[k] = Some(id);
            members.push(k);

            let expansion = neighbors(values, k, eps, &mut distance)?;
            if expansion.len() >= min_points {
                for &p in &expansion {
                    if !in_frontier[p] {
                        in_frontier.set(p, true);
                        frontier.push(p);
                    }
                }
            }
        }

        clusters.push(Cluster { id, points: members });
    }

    let outliers: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.is_none())
        .map(|(i, _)| i)
        .collect();

    trace!(
        values = values.len(),
        clusters = clusters.len(),
        outliers = outliers.len(),
        "clustering pass complete"
    );

    Ok((clusters, outliers))
}

/// Finds all indices whose distance to `values[i]` is strictly below `eps`
///
/// Linear scan over the whole value slice; the point itself qualifies
/// whenever `eps > 0` since its self-distance is zero.
pub fn neighbors<T, F>(
    values: &[T],
    i: usize,
    eps: f64,
    distance: &mut F,
) -> Result<Vec<usize>, ClusterError>
where
    F: FnMut(&T, &T) -> Result<f64, DistanceError>,
{
    let mut result = Vec::new();

    for (j, value) in values.iter().enumerate() {
        let d = distance(&values[i], value)?;
        if !d.is_finite() {
            return Err(ClusterError::Metric(DistanceError::NonFiniteDistance {
                got: d,
            }));
        }
        if d < eps {
            result.push(j);
        }
    }

    Ok(result)
}
