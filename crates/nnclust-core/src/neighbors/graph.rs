//! Flat k-nearest-neighbor graph.

use super::neighbor::Neighbor;
use crate::error::{Error, Result};

/// For each of `n` points, `k` neighbors sorted ascending by
/// `(distance, index)`, with no self references and no duplicates.
///
/// Entries are stored flat, row `p` at `[p * k, (p + 1) * k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborGraph {
    n: usize,
    k: usize,
    entries: Vec<Neighbor>,
}

impl NeighborGraph {
    pub(crate) fn from_entries(n: usize, k: usize, entries: Vec<Neighbor>) -> Self {
        debug_assert_eq!(entries.len(), n * k);
        Self { n, k, entries }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns true if the graph has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Neighbors per point.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Sorted neighbor list of point `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p >= len()`.
    #[must_use]
    #[inline]
    pub fn neighbors(&self, p: usize) -> &[Neighbor] {
        &self.entries[p * self.k..(p + 1) * self.k]
    }

    /// All entries, row-major.
    #[must_use]
    pub fn entries(&self) -> &[Neighbor] {
        &self.entries
    }

    /// Flat neighbor indices, row-major, as the C ABI returns them.
    #[must_use]
    pub fn indices(&self) -> Vec<i64> {
        self.entries.iter().map(|nb| nb.index as i64).collect()
    }

    /// Flat neighbor distances, row-major.
    #[must_use]
    pub fn distances(&self) -> Vec<f64> {
        self.entries.iter().map(|nb| nb.distance).collect()
    }

    /// Copies the graph into caller-owned buffers of length `n * k`.
    ///
    /// Both lengths are checked before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if either buffer has the wrong
    /// length.
    pub fn write_into(&self, out_indices: &mut [i64], out_distances: &mut [f64]) -> Result<()> {
        let expected = self.entries.len();
        for actual in [out_indices.len(), out_distances.len()] {
            if actual != expected {
                return Err(Error::DimensionMismatch { expected, actual });
            }
        }
        for ((nb, idx), dist) in self
            .entries
            .iter()
            .zip(out_indices.iter_mut())
            .zip(out_distances.iter_mut())
        {
            *idx = nb.index as i64;
            *dist = nb.distance;
        }
        Ok(())
    }

    /// The largest nearest-neighbor distance over all points.
    ///
    /// Every point has at least one other point within this radius. Returns
    /// `0.0` for a graph with no neighbors.
    #[must_use]
    pub fn nearest_neighbor_radius(&self) -> f64 {
        if self.k == 0 {
            return 0.0;
        }
        (0..self.n)
            .map(|p| self.neighbors(p)[0].distance)
            .fold(0.0, f64::max)
    }

    /// Fraction of `exact`'s neighbor indices also present in this graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the graphs differ in `n` or
    /// `k`.
    pub fn recall(&self, exact: &Self) -> Result<f64> {
        if self.n != exact.n || self.k != exact.k {
            return Err(Error::DimensionMismatch {
                expected: exact.n * exact.k,
                actual: self.n * self.k,
            });
        }
        if self.entries.is_empty() {
            return Ok(1.0);
        }
        let hits: usize = (0..self.n)
            .map(|p| {
                let approx = self.neighbors(p);
                exact
                    .neighbors(p)
                    .iter()
                    .filter(|e| approx.iter().any(|a| a.index == e.index))
                    .count()
            })
            .sum();
        Ok(hits as f64 / self.entries.len() as f64)
    }
}
