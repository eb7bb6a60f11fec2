//! NN-descent: iterative approximate k-NN graph construction.
//!
//! Each point starts from `k` seeded random neighbors. Every round then
//! joins, for each point `p`, the neighbors and reverse neighbors of `p`'s
//! neighbors and reverse neighbors, keeping the best `k`.
//!
//! Rounds are double buffered: a round reads only the previous round's
//! snapshot and writes each point's new list into a fresh buffer slot owned
//! by exactly one partition. The buffers are swapped once the round is
//! complete, so the graph after every round is the same whatever the
//! executor.
//!
//! # References
//!
//! - Dong, Charikar & Li, "Efficient K-Nearest Neighbor Graph Construction
//!   for Generic Similarity Measures" (WWW 2011)

use super::exact::{build_exact, validate_k};
use super::graph::NeighborGraph;
use super::neighbor::Neighbor;
use crate::config::NeighborsConfig;
use crate::distance::DistanceMetric;
use crate::error::{try_filled, try_reserve, Error, Result};
use crate::executor::ParallelExecutor;
use crate::point_set::PointSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Approximate k-NN graph builder parameterized over an executor.
///
/// # Example
///
/// ```rust,ignore
/// use nnclust_core::{DistanceMetric, NeighborSearch, PointSet, SerialExecutor};
///
/// let points = PointSet::new(&data, n, d)?;
/// let graph = NeighborSearch::new(SerialExecutor)
///     .build(&points, 10, DistanceMetric::Euclidean, 10, 42)?;
/// ```
#[derive(Debug, Clone)]
pub struct NeighborSearch<E> {
    executor: E,
    config: NeighborsConfig,
}

impl<E: ParallelExecutor> NeighborSearch<E> {
    /// Creates a builder with default tuning.
    #[must_use]
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            config: NeighborsConfig::default(),
        }
    }

    /// Builder: set tuning parameters.
    #[must_use]
    pub fn with_config(mut self, config: NeighborsConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: set the size at or below which the exact graph is returned.
    #[must_use]
    pub fn with_exact_threshold(mut self, threshold: usize) -> Self {
        self.config.exact_threshold = threshold;
        self
    }

    /// Builder: set the convergence fraction.
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.config.delta = delta;
        self
    }

    /// Returns the tuning parameters.
    #[must_use]
    pub fn config(&self) -> &NeighborsConfig {
        &self.config
    }

    /// Builds an approximate k-nearest-neighbor graph.
    ///
    /// Stops after `max_iterations` rounds, or earlier once a round changes
    /// fewer than `delta * n * k` list entries. Sets of at most
    /// `exact_threshold` points get the exact graph. All rounds of one call
    /// run within a single executor session.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidInput`] unless `0 < k < n`, or if the tuning
    ///   fails [`NeighborsConfig::validate`]
    /// - [`crate::Error::NumericError`] if any distance is not finite
    /// - [`crate::Error::OutOfMemory`] if a buffer cannot be reserved
    pub fn build(
        &self,
        points: &PointSet<'_>,
        k: usize,
        metric: DistanceMetric,
        max_iterations: usize,
        seed: u64,
    ) -> Result<NeighborGraph> {
        let n = points.len();
        validate_k(n, k)?;
        self.config.validate().map_err(|e| Error::invalid(e.to_string()))?;

        if n <= self.config.exact_threshold {
            debug!(n, k, threshold = self.config.exact_threshold, "using exact graph");
            return build_exact(&self.executor, points, k, metric);
        }

        self.executor.session(|executor| {
            descend(executor, &self.config, points, k, metric, max_iterations, seed)
        })
    }
}

/// Random initialization followed by up to `max_iterations` join rounds.
fn descend<E: ParallelExecutor>(
    executor: &E,
    config: &NeighborsConfig,
    points: &PointSet<'_>,
    k: usize,
    metric: DistanceMetric,
    max_iterations: usize,
    seed: u64,
) -> Result<NeighborGraph> {
    let n = points.len();
    let mut current = try_filled(n * k, Neighbor::EMPTY)?;
    executor.fill_slots(n, &mut current, k, |part, slots| {
        for (row, p) in slots.chunks_exact_mut(k).zip(part.range()) {
            init_row(points, p, k, metric, seed, row)?;
        }
        Ok(())
    })?;

    let mut next = try_filled(n * k, Neighbor::EMPTY)?;
    let reverse_cap = if config.reverse_cap == 0 {
        k
    } else {
        config.reverse_cap
    };
    let capacity = scratch_capacity(n, k, reverse_cap);
    let threshold = config.delta * (n * k) as f64;
    let mut rounds = 0;

    for round in 0..max_iterations {
        let reverse = ReverseLists::build(&current, n, k, reverse_cap)?;
        let updates = AtomicUsize::new(0);
        let snapshot = Snapshot {
            entries: &current,
            reverse: &reverse,
            k,
        };

        executor.fill_slots(n, &mut next, k, |part, slots| {
            let mut scratch = JoinScratch::new(capacity)?;
            let mut changed = 0;
            for (row, p) in slots.chunks_exact_mut(k).zip(part.range()) {
                changed += local_join(points, metric, &snapshot, p, &mut scratch, row)?;
            }
            updates.fetch_add(changed, Ordering::Relaxed);
            Ok(())
        })?;

        std::mem::swap(&mut current, &mut next);
        rounds = round + 1;

        let updates = updates.into_inner();
        debug!(round, updates, threshold, "nn-descent round");
        if updates == 0 || (updates as f64) < threshold {
            break;
        }
    }

    info!(n, k, rounds, workers = executor.workers(), "neighbor graph built");
    Ok(NeighborGraph::from_entries(n, k, current))
}

/// Fills `row` with `k` distinct random neighbors of `p`, sorted.
///
/// The generator is seeded from `seed` with stream `p`, so every point's
/// initial list is independent of which worker computes it.
fn init_row(
    points: &PointSet<'_>,
    p: usize,
    k: usize,
    metric: DistanceMetric,
    seed: u64,
    row: &mut [Neighbor],
) -> Result<()> {
    let n = points.len();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(p as u64);

    let origin = points.point(p);
    let sampled = rand::seq::index::sample(&mut rng, n - 1, k);
    for (slot, j) in row.iter_mut().zip(sampled.iter()) {
        // Sample from the n - 1 other points by skipping over p
        let q = if j >= p { j + 1 } else { j };
        *slot = Neighbor::new(q, metric.checked(origin, points.point(q))?);
    }
    row.sort_unstable();
    Ok(())
}

/// Reverse neighbor lists derived from one snapshot.
///
/// Built sequentially in ascending source order so the capped lists are the
/// same on every run.
struct ReverseLists {
    cap: usize,
    lens: Vec<usize>,
    slots: Vec<usize>,
}

impl ReverseLists {
    fn build(entries: &[Neighbor], n: usize, k: usize, cap: usize) -> Result<Self> {
        let mut lens = try_filled(n, 0usize)?;
        let mut slots = try_filled(n * cap, usize::MAX)?;
        for (q, row) in entries.chunks_exact(k).enumerate() {
            for nb in row {
                let p = nb.index;
                if lens[p] < cap {
                    slots[p * cap + lens[p]] = q;
                    lens[p] += 1;
                }
            }
        }
        Ok(Self { cap, lens, slots })
    }

    #[inline]
    fn get(&self, p: usize) -> &[usize] {
        &self.slots[p * self.cap..p * self.cap + self.lens[p]]
    }
}

/// Read-only view of the previous round.
struct Snapshot<'a> {
    entries: &'a [Neighbor],
    reverse: &'a ReverseLists,
    k: usize,
}

impl Snapshot<'_> {
    #[inline]
    fn forward(&self, p: usize) -> &[Neighbor] {
        &self.entries[p * self.k..(p + 1) * self.k]
    }
}

/// Candidates one local join can gather: the point's own list plus the lists
/// of up to `k + reverse_cap` neighbors, each with its reverse list. Never
/// more than the `n` points of the set.
pub(crate) fn scratch_capacity(n: usize, k: usize, reverse_cap: usize) -> usize {
    let fanout = k.saturating_add(reverse_cap);
    fanout
        .saturating_mul(fanout.saturating_add(1))
        .saturating_add(k)
        .min(n)
}

/// Per-worker buffers reused across points.
struct JoinScratch {
    seen: FxHashSet<usize>,
    merged: Vec<Neighbor>,
}

impl JoinScratch {
    fn new(capacity: usize) -> Result<Self> {
        let mut seen = FxHashSet::default();
        seen.try_reserve(capacity).map_err(|_| Error::OutOfMemory {
            bytes: capacity.saturating_mul(std::mem::size_of::<usize>()),
        })?;
        let mut merged = Vec::new();
        try_reserve(&mut merged, capacity)?;
        Ok(Self { seen, merged })
    }
}

/// Computes the next list of `p` into `row`; returns how many entries of the
/// new list were not in the old one.
fn local_join(
    points: &PointSet<'_>,
    metric: DistanceMetric,
    snapshot: &Snapshot<'_>,
    p: usize,
    scratch: &mut JoinScratch,
    row: &mut [Neighbor],
) -> Result<usize> {
    let JoinScratch { seen, merged } = scratch;
    seen.clear();
    merged.clear();

    let current = snapshot.forward(p);
    seen.insert(p);
    for nb in current {
        seen.insert(nb.index);
        merged.push(*nb);
    }

    let origin = points.point(p);
    let mut consider = |q: usize| -> Result<()> {
        if seen.insert(q) {
            merged.push(Neighbor::new(q, metric.checked(origin, points.point(q))?));
        }
        Ok(())
    };

    let reverse = snapshot.reverse.get(p);
    for &q in reverse {
        consider(q)?;
    }
    for q in current.iter().map(|nb| nb.index).chain(reverse.iter().copied()) {
        for nb in snapshot.forward(q) {
            consider(nb.index)?;
        }
        for &r in snapshot.reverse.get(q) {
            consider(r)?;
        }
    }

    let k = row.len();
    if k < merged.len() {
        merged.select_nth_unstable(k - 1);
        merged.truncate(k);
    }
    merged.sort_unstable();
    row.copy_from_slice(&merged[..]);

    Ok(row
        .iter()
        .filter(|nb| !current.iter().any(|old| old.index == nb.index))
        .count())
}
