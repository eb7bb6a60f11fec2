//! A single `(index, distance)` entry of a neighbor list.
//!
//! Ordering is total: by distance using IEEE 754 `total_cmp`, then by
//! ascending index, so sorting a candidate list gives the same result on
//! every thread and every run.

use std::cmp::Ordering;

/// One neighbor of a point.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    /// Index of the neighboring point.
    pub index: usize,
    /// Distance to the neighboring point.
    pub distance: f64,
}

impl Neighbor {
    /// Placeholder for an unfilled slot; sorts after every real neighbor.
    pub(crate) const EMPTY: Self = Self {
        index: usize::MAX,
        distance: f64::INFINITY,
    };

    /// Creates a neighbor entry.
    #[must_use]
    pub const fn new(index: usize, distance: f64) -> Self {
        Self { index, distance }
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        // Bit comparison keeps Eq consistent with total_cmp
        self.index == other.index && self.distance.to_bits() == other.distance.to_bits()
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}
