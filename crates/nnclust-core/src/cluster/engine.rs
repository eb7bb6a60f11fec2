//! DBSCAN-style labeling driven by a k-NN graph.
//!
//! Three passes:
//!
//! 1. **Core** (parallel, one slot per point): collect the graph neighbors
//!    within `epsilon`. A list with every entry inside `epsilon` may be hiding
//!    more neighbors, so such points fall back to a brute-force range query.
//! 2. **Union** (parallel): link points through [`ConcurrentUnionFind`]
//!    according to the [`BorderPolicy`].
//! 3. **Label** (sequential): number components in index order of their
//!    first core point.

use super::union_find::ConcurrentUnionFind;
use super::{BorderPolicy, ClusterAssignment, NeighborInput, NOISE};
use crate::config::{ClusterConfig, NeighborsConfig};
use crate::distance::DistanceMetric;
use crate::error::{try_filled, try_reserve, Error, Result};
use crate::executor::ParallelExecutor;
use crate::neighbors::{Neighbor, NeighborGraph, NeighborSearch};
use crate::point_set::PointSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Result of the core pass for one point.
#[derive(Debug, Clone, Default)]
struct CoreSlot {
    core: bool,
    /// Distinct points within `epsilon`, sorted by (distance, index).
    within: Vec<Neighbor>,
}

/// Density clustering parameterized over an executor.
///
/// # Example
///
/// ```rust,ignore
/// use nnclust_core::{ClusterEngine, PointSet, SerialExecutor};
///
/// let points = PointSet::new(&data, n, d)?;
/// let assignment = ClusterEngine::new(SerialExecutor).cluster(&points, None, 0.5, 4)?;
/// ```
#[derive(Debug, Clone)]
pub struct ClusterEngine<E> {
    executor: E,
    config: ClusterConfig,
    neighbors: NeighborsConfig,
}

impl<E: ParallelExecutor> ClusterEngine<E> {
    /// Creates an engine with default tuning.
    #[must_use]
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            config: ClusterConfig::default(),
            neighbors: NeighborsConfig::default(),
        }
    }

    /// Builder: set cluster tuning.
    #[must_use]
    pub fn with_config(mut self, config: ClusterConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: set tuning for internally built graphs.
    #[must_use]
    pub fn with_neighbors_config(mut self, neighbors: NeighborsConfig) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Builder: set the metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Builder: set the border policy.
    #[must_use]
    pub fn with_border_policy(mut self, policy: BorderPolicy) -> Self {
        self.config.border_policy = policy;
        self
    }

    /// Returns the cluster tuning.
    #[must_use]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Labels every point with a cluster id or [`NOISE`].
    ///
    /// Without `graph`, a k-NN graph is built with
    /// `k = min(max(min_pts, min_graph_k), n - 1)`.
    ///
    /// Core status is read from the graph. A point is never marked core
    /// unless `min_pts` points really lie within `epsilon`, but with an
    /// approximate graph (NN-descent above `exact_threshold` points) a point
    /// whose list misses some of its epsilon-neighbors can be left non-core.
    /// Pass an exact graph when core flags must match brute force.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a non-positive or non-finite `epsilon`,
    ///   `min_pts == 0`, more than `i32::MAX` points, or tuning that fails
    ///   validation
    /// - [`Error::DimensionMismatch`] if `graph` does not have `n` rows
    /// - [`Error::NumericError`] if a distance is not finite
    /// - [`Error::OutOfMemory`] if a buffer cannot be reserved
    pub fn cluster(
        &self,
        points: &PointSet<'_>,
        graph: Option<NeighborInput<'_>>,
        epsilon: f64,
        min_pts: usize,
    ) -> Result<ClusterAssignment> {
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(Error::invalid(format!(
                "epsilon must be finite and positive, got {epsilon}"
            )));
        }
        if min_pts == 0 {
            return Err(Error::invalid("min_pts must be at least 1"));
        }
        self.config
            .validate()
            .and_then(|()| self.neighbors.validate())
            .map_err(|e| Error::invalid(e.to_string()))?;
        let n = points.len();
        if i32::try_from(n).is_err() {
            return Err(Error::invalid(format!("too many points for i32 labels: {n}")));
        }
        if let Some(input) = &graph {
            if input.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    actual: input.len(),
                });
            }
        }
        if n == 0 {
            return Ok(ClusterAssignment::new(Vec::new(), Vec::new(), 0));
        }

        let built;
        let input = match graph {
            Some(input) => Some(input),
            None if n > 1 => {
                built = self.build_graph(points, min_pts)?;
                Some(NeighborInput::Graph(&built))
            }
            None => None,
        };

        let slots = self.core_pass(points, input.as_ref(), epsilon, min_pts)?;
        let forest = ConcurrentUnionFind::new(n)?;
        self.union_pass(&slots, &forest)?;
        let assignment = label(&slots, &forest)?;

        info!(
            n,
            clusters = assignment.cluster_count(),
            noise = assignment.noise_count(),
            policy = ?self.config.border_policy,
            "clustering complete"
        );
        Ok(assignment)
    }

    fn build_graph(&self, points: &PointSet<'_>, min_pts: usize) -> Result<NeighborGraph> {
        let n = points.len();
        let k = min_pts.max(self.config.min_graph_k).min(n - 1);
        debug!(n, k, "building neighbor graph for clustering");
        NeighborSearch::new(&self.executor)
            .with_config(self.neighbors.clone())
            .build(
                points,
                k,
                self.config.metric,
                self.neighbors.max_iterations,
                self.neighbors.seed,
            )
    }

    fn core_pass(
        &self,
        points: &PointSet<'_>,
        input: Option<&NeighborInput<'_>>,
        epsilon: f64,
        min_pts: usize,
    ) -> Result<Vec<CoreSlot>> {
        let n = points.len();
        let k = input.map_or(0, NeighborInput::k);
        let metric = self.config.metric;
        let saturated = AtomicUsize::new(0);

        let mut slots = try_filled(n, CoreSlot::default())?;
        self.executor.fill_slots(n, &mut slots, 1, |part, out| {
            let mut fallbacks = 0;
            for (slot, p) in out.iter_mut().zip(part.range()) {
                let origin = points.point(p);
                let mut present = 0;
                try_reserve(&mut slot.within, k)?;
                if let Some(input) = input {
                    for j in 0..k {
                        let Some(q) = input.neighbor_at(p, j) else {
                            continue;
                        };
                        present += 1;
                        let distance = metric.checked(origin, points.point(q))?;
                        if distance <= epsilon {
                            slot.within.push(Neighbor::new(q, distance));
                        }
                    }
                }

                if present == k && slot.within.len() == k {
                    // Every listed neighbor is inside epsilon; there may be more
                    fallbacks += 1;
                    range_query(points, p, epsilon, metric, &mut slot.within)?;
                }

                slot.within.sort_unstable();
                slot.within.dedup_by_key(|nb| nb.index);
                slot.core = 1 + slot.within.len() >= min_pts;
            }
            saturated.fetch_add(fallbacks, Ordering::Relaxed);
            Ok(())
        })?;

        let saturated = saturated.into_inner();
        if n > 1 && saturated * 2 > n {
            warn!(
                saturated,
                n, k, "most neighbor lists lie inside epsilon; falling back to range queries"
            );
        } else {
            debug!(saturated, n, k, "core pass complete");
        }
        Ok(slots)
    }

    fn union_pass(&self, slots: &[CoreSlot], forest: &ConcurrentUnionFind) -> Result<()> {
        let n = slots.len();
        match self.config.border_policy {
            BorderPolicy::Merge => self.executor.for_each_index(n, |p| {
                for nb in &slots[p].within {
                    if slots[p].core || slots[nb.index].core {
                        forest.union(p, nb.index);
                    }
                }
                Ok(())
            }),
            BorderPolicy::Nearest => {
                let anchors = nearest_core(slots)?;
                self.executor.for_each_index(n, |p| {
                    if slots[p].core {
                        for nb in slots[p].within.iter().filter(|nb| slots[nb.index].core) {
                            forest.union(p, nb.index);
                        }
                    } else if let Some(anchor) = anchors[p] {
                        forest.union(p, anchor.index);
                    }
                    Ok(())
                })
            }
        }
    }
}

/// Replaces `within` with every other point within `epsilon` of `p`.
fn range_query(
    points: &PointSet<'_>,
    p: usize,
    epsilon: f64,
    metric: DistanceMetric,
    within: &mut Vec<Neighbor>,
) -> Result<()> {
    within.clear();
    let origin = points.point(p);
    for q in (0..points.len()).filter(|&q| q != p) {
        let distance = metric.checked(origin, points.point(q))?;
        if distance <= epsilon {
            try_reserve(within, 1)?;
            within.push(Neighbor::new(q, distance));
        }
    }
    Ok(())
}

/// For each non-core point, the nearest core point linked to it in either
/// direction. Ties go to the smaller index.
fn nearest_core(slots: &[CoreSlot]) -> Result<Vec<Option<Neighbor>>> {
    let mut anchors: Vec<Option<Neighbor>> = try_filled(slots.len(), None)?;
    let mut offer = |border: usize, candidate: Neighbor| {
        let best = &mut anchors[border];
        if best.is_none_or(|current| candidate < current) {
            *best = Some(candidate);
        }
    };
    for (p, slot) in slots.iter().enumerate() {
        for nb in &slot.within {
            let q = nb.index;
            if slot.core && !slots[q].core {
                offer(q, Neighbor::new(p, nb.distance));
            } else if !slot.core && slots[q].core {
                offer(p, *nb);
            }
        }
    }
    Ok(anchors)
}

/// Numbers components by their first core point in index order.
fn label(slots: &[CoreSlot], forest: &ConcurrentUnionFind) -> Result<ClusterAssignment> {
    let n = forest.len();
    let mut root_labels = try_filled(n, NOISE)?;
    let mut next: i32 = 0;
    for p in (0..n).filter(|&p| slots[p].core) {
        let root = forest.find(p);
        if root_labels[root] == NOISE {
            root_labels[root] = next;
            next += 1;
        }
    }

    let mut labels = try_filled(n, NOISE)?;
    let mut core = try_filled(n, false)?;
    for (p, slot) in slots.iter().enumerate() {
        labels[p] = root_labels[forest.find(p)];
        core[p] = slot.core;
    }
    // next <= n <= i32::MAX, checked on entry
    Ok(ClusterAssignment::new(labels, core, next as usize))
}
