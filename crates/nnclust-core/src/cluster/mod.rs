//! Density clustering over a neighbor graph.
//!
//! [`ClusterEngine`] labels points DBSCAN-style: core points are those with
//! at least `min_pts` points (themselves included) within `epsilon`, core
//! points within `epsilon` of each other share a cluster, and points reached
//! by no core point are noise.

mod engine;
mod union_find;


pub use engine::ClusterEngine;

use crate::error::{Error, Result};
use crate::neighbors::NeighborGraph;
use serde::{Deserialize, Serialize};

/// Label of points that belong to no cluster.
pub const NOISE: i32 = -1;

/// How non-core points join clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Every edge within `epsilon` with at least one core endpoint is a
    /// union. A non-core point within reach of two clusters joins them.
    #[default]
    Merge,
    /// Only core–core edges are unions. A non-core point takes the cluster
    /// of its nearest core point (ties to the smaller index), so clusters
    /// never join through a non-core point.
    Nearest,
}

/// Index-only neighbor lists supplied by a host, `n` rows of `k` entries.
///
/// Negative entries are padding and ignored.
#[derive(Debug, Clone, Copy)]
pub struct NeighborIndices<'a> {
    indices: &'a [i64],
    n: usize,
    k: usize,
}

impl<'a> NeighborIndices<'a> {
    /// Wraps and validates a flat `n * k` index buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `indices.len() != n * k`
    /// - [`Error::InvalidInput`] if an entry is `>= n` or references its own row
    pub fn new(indices: &'a [i64], n: usize, k: usize) -> Result<Self> {
        let expected = n
            .checked_mul(k)
            .ok_or_else(|| Error::invalid(format!("n * k overflows ({n} * {k})")))?;
        if indices.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: indices.len(),
            });
        }
        if k > 0 {
            for (p, row) in indices.chunks_exact(k).enumerate() {
                for &q in row.iter().filter(|&&q| q >= 0) {
                    if q as u64 >= n as u64 {
                        return Err(Error::invalid(format!(
                            "neighbor {q} of point {p} is out of range (n = {n})"
                        )));
                    }
                    if q as usize == p {
                        return Err(Error::invalid(format!("point {p} lists itself")));
                    }
                }
            }
        }
        Ok(Self { indices, n, k })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Entries per row.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }
}

/// Neighbor lists the cluster engine can consume.
#[derive(Debug, Clone, Copy)]
pub enum NeighborInput<'a> {
    /// A graph built by [`crate::NeighborSearch`] or [`crate::build_exact`].
    Graph(&'a NeighborGraph),
    /// Host-supplied index lists.
    Indices(NeighborIndices<'a>),
}

impl NeighborInput<'_> {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Graph(graph) => graph.len(),
            Self::Indices(indices) => indices.len(),
        }
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries per row.
    #[must_use]
    pub fn k(&self) -> usize {
        match self {
            Self::Graph(graph) => graph.k(),
            Self::Indices(indices) => indices.k(),
        }
    }

    /// The `j`-th neighbor of `p`, or `None` for a padding entry.
    #[inline]
    pub(crate) fn neighbor_at(&self, p: usize, j: usize) -> Option<usize> {
        match self {
            Self::Graph(graph) => Some(graph.neighbors(p)[j].index),
            Self::Indices(indices) => {
                let q = indices.indices[p * indices.k + j];
                usize::try_from(q).ok()
            }
        }
    }
}

impl<'a> From<&'a NeighborGraph> for NeighborInput<'a> {
    fn from(graph: &'a NeighborGraph) -> Self {
        Self::Graph(graph)
    }
}

impl<'a> From<NeighborIndices<'a>> for NeighborInput<'a> {
    fn from(indices: NeighborIndices<'a>) -> Self {
        Self::Indices(indices)
    }
}

/// Cluster label per point, numbered `0..cluster_count()` by first discovery
/// in index order, or [`NOISE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<i32>,
    core: Vec<bool>,
    clusters: usize,
}

impl ClusterAssignment {
    pub(crate) fn new(labels: Vec<i32>, core: Vec<bool>, clusters: usize) -> Self {
        Self {
            labels,
            core,
            clusters,
        }
    }

    /// Labels, one per point.
    #[must_use]
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Consumes the assignment, returning the labels.
    #[must_use]
    pub fn into_labels(self) -> Vec<i32> {
        self.labels
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters
    }

    /// Number of noise points.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }

    /// Returns true if point `p` is noise.
    #[must_use]
    pub fn is_noise(&self, p: usize) -> bool {
        self.labels[p] == NOISE
    }

    /// Returns true if point `p` is a core point.
    #[must_use]
    pub fn is_core(&self, p: usize) -> bool {
        self.core[p]
    }

    /// Indices of the points labeled `label`, ascending.
    #[must_use]
    pub fn members(&self, label: i32) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(p, _)| p)
            .collect()
    }

    /// Copies the labels into a caller-owned buffer of length `n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `out` has the wrong length.
    pub fn write_into(&self, out: &mut [i32]) -> Result<()> {
        if out.len() != self.labels.len() {
            return Err(Error::DimensionMismatch {
                expected: self.labels.len(),
                actual: out.len(),
            });
        }
        out.copy_from_slice(&self.labels);
        Ok(())
    }
}
