//! Recompute orchestration over the clustering pipeline
//!
//! [`clusterize`] runs one synchronous pass: threshold-derived or explicit
//! epsilon, density clustering, then geometry aggregation. [`Clusterizer`]
//! wraps the pass in a state machine that recomputes immediately on
//! point-set mutations and coalesces rapid viewport changes behind a
//! settling window.
//!
//! The controller is single-threaded and never blocks: instead of owning a
//! timer it records a deadline, and the embedding event loop drives it by
//! calling [`Clusterizer::poll`] with the current instant.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cluster::dbscan::{ClusterError, db_scan};
use crate::cluster::distance::geo_metric;
use crate::cluster::geometry::{MapCluster, aggregate};
use crate::cluster::point::MapLocatable;
use crate::cluster::threshold::{DEFAULT_SPAN_FACTOR, Region, span_distance, threshold};

/// Groups located values with an explicit epsilon
///
/// # Arguments
///
/// * `values` - Values to group; cloned into the output clusters
/// * `eps` - Neighbor-inclusion radius in meters
/// * `min_points` - Minimum neighborhood size to seed or extend a cluster
///
/// # Returns
///
/// A tuple `(clusters, outliers)`; together they contain every input value
/// exactly once
pub fn clusterize<T>(
    values: &[T],
    eps: f64,
    min_points: usize,
) -> Result<(Vec<MapCluster<T>>, Vec<T>), ClusterError>
where
    T: MapLocatable + Clone,
{
    let (clusters, outliers) = db_scan(values, eps, min_points, geo_metric)?;

    let clusters = clusters
        .into_iter()
        .map(|c| {
            let members = c.points.iter().map(|&i| values[i].clone()).collect();
            aggregate(c.id, members)
        })
        .collect();
    let outliers = outliers.iter().map(|&i| values[i].clone()).collect();

    Ok((clusters, outliers))
}

/// Groups located values with the epsilon derived from a viewport region
///
/// # Panics
///
/// Panics if `factor` is not strictly positive
pub fn clusterize_in_region<T>(
    values: &[T],
    region: &Region,
    factor: f64,
    min_points: usize,
) -> Result<(Vec<MapCluster<T>>, Vec<T>), ClusterError>
where
    T: MapLocatable + Clone,
{
    clusterize(values, threshold(region, factor), min_points)
}

/// Recompute policy knobs
#[derive(Debug, Clone)]
pub struct RecomputeConfig {
    /// Divisor converting the viewport span distance into epsilon
    pub span_factor: f64,
    /// Minimum neighborhood size, the point itself included
    pub min_points: usize,
    /// Settling window applied to viewport span changes
    pub span_debounce: Duration,
    /// Settling window for point-set mutations; `None` recomputes
    /// immediately
    pub mutation_debounce: Option<Duration>,
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            span_factor: DEFAULT_SPAN_FACTOR,
            min_points: 1,
            span_debounce: Duration::from_millis(100),
            mutation_debounce: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Pending { deadline: Instant },
}

/// Debounced clustering controller for an interactive map
///
/// Owns the value snapshot, the current viewport, and the published cluster
/// list. Mutations and viewport changes mark the controller pending; when a
/// pending deadline elapses (observed through [`poll`](Self::poll)) the pass
/// runs over the latest snapshot, so intermediate states during a rapid
/// drag are never published.
///
/// A failed pass keeps the previously published list; the error surfaces to
/// the caller and the controller returns to idle.
#[derive(Debug)]
pub struct Clusterizer<T> {
    values: Vec<T>,
    region: Region,
    config: RecomputeConfig,
    state: State,
    clusters: Vec<MapCluster<T>>,
    outliers: Vec<T>,
}

impl<T> Clusterizer<T>
where
    T: MapLocatable + Clone + PartialEq,
{
    /// Creates an idle controller with no values and no published clusters
    pub fn new(region: Region, config: RecomputeConfig) -> Self {
        Self {
            values: Vec::new(),
            region,
            config,
            state: State::Idle,
            clusters: Vec::new(),
            outliers: Vec::new(),
        }
    }

    /// The published cluster list from the last successful pass
    pub fn clusters(&self) -> &[MapCluster<T>] {
        &self.clusters
    }

    /// Values left outside every cluster in the last successful pass
    pub fn outliers(&self) -> &[T] {
        &self.outliers
    }

    /// The current value snapshot
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The most recently observed viewport
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Deadline of the pending recompute, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Pending { deadline } => Some(deadline),
            State::Idle => None,
        }
    }

    /// Replaces the whole value set (initial load or wholesale refresh)
    pub fn set_values(&mut self, values: Vec<T>, now: Instant) -> Result<(), ClusterError> {
        self.values = values;
        self.on_mutation(now)
    }

    /// Adds a value to the set
    pub fn push(&mut self, value: T, now: Instant) -> Result<(), ClusterError> {
        self.values.push(value);
        self.on_mutation(now)
    }

    /// Removes the first value equal to `value`
    ///
    /// # Returns
    ///
    /// `false` when no value matched; nothing is scheduled in that case
    pub fn remove(&mut self, value: &T, now: Instant) -> Result<bool, ClusterError> {
        match self.values.iter().position(|v| v == value) {
            Some(i) => {
                self.values.remove(i);
                self.on_mutation(now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Observes a viewport change
    ///
    /// Schedules a debounced recompute only when the span ground distance
    /// actually changed; a pure pan keeps the derived epsilon and is not a
    /// qualifying event. Each qualifying change resets the single pending
    /// deadline.
    pub fn set_region(&mut self, region: Region, now: Instant) {
        let qualifying = span_distance(&region) != span_distance(&self.region);
        self.region = region;

        if qualifying {
            let deadline = now + self.config.span_debounce;
            trace!(?deadline, "viewport span changed, rescheduling recompute");
            self.state = State::Pending { deadline };
        }
    }

    /// Fires the pending recompute if its settling window has elapsed
    ///
    /// # Returns
    ///
    /// Whether a pass ran; `Ok(false)` when idle or still settling
    pub fn poll(&mut self, now: Instant) -> Result<bool, ClusterError> {
        match self.state {
            State::Pending { deadline } if now >= deadline => {
                self.state = State::Idle;
                self.recompute()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn on_mutation(&mut self, now: Instant) -> Result<(), ClusterError> {
        match self.config.mutation_debounce {
            None => {
                // Immediate pass; any pending viewport deadline is absorbed
                // since the pass already sees the latest region.
                self.state = State::Idle;
                self.recompute()
            }
            Some(window) => {
                self.state = State::Pending {
                    deadline: now + window,
                };
                Ok(())
            }
        }
    }

    fn recompute(&mut self) -> Result<(), ClusterError> {
        let eps = threshold(&self.region, self.config.span_factor);
        let (clusters, outliers) = clusterize(&self.values, eps, self.config.min_points)?;

        debug!(
            eps,
            values = self.values.len(),
            clusters = clusters.len(),
            outliers = outliers.len(),
            "recompute complete"
        );

        self.clusters = clusters;
        self.outliers = outliers;
        Ok(())
    }
}
