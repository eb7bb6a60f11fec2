//! Lock-free union-find over point indices.
//!
//! Every parent pointer only ever moves to a smaller index: a union links
//! the larger-index root under the smaller-index root with a single
//! compare-and-swap, and `find` halves paths with compare-and-swap. The root
//! of each component is therefore its smallest member no matter how unions
//! from different threads interleave.

use crate::error::{try_reserve, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Concurrent disjoint-set forest with index-ordered linking.
#[derive(Debug)]
pub(crate) struct ConcurrentUnionFind {
    parent: Vec<AtomicUsize>,
}

impl ConcurrentUnionFind {
    /// Creates `n` singleton sets.
    pub(crate) fn new(n: usize) -> Result<Self> {
        let mut parent = Vec::new();
        try_reserve(&mut parent, n)?;
        parent.extend((0..n).map(AtomicUsize::new));
        Ok(Self { parent })
    }

    /// Number of elements.
    pub(crate) fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns the root of `x`'s set.
    pub(crate) fn find(&self, mut x: usize) -> usize {
        loop {
            let parent = self.parent[x].load(Ordering::Acquire);
            if parent == x {
                return x;
            }
            let grandparent = self.parent[parent].load(Ordering::Acquire);
            if grandparent != parent {
                // Path halving; losing the race only means a longer path
                let _ = self.parent[x].compare_exchange_weak(
                    parent,
                    grandparent,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                );
            }
            x = parent;
        }
    }

    /// Merges the sets of `a` and `b`; returns false if already merged.
    pub(crate) fn union(&self, a: usize, b: usize) -> bool {
        loop {
            let root_a = self.find(a);
            let root_b = self.find(b);
            if root_a == root_b {
                return false;
            }
            let (low, high) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            if self.parent[high]
                .compare_exchange(high, low, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return true;
            }
            // `high` was linked elsewhere meanwhile; retry from the new roots
        }
    }
}
