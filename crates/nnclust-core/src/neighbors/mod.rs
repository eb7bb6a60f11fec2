//! k-nearest-neighbor graphs.
//!
//! - [`NeighborSearch`]: approximate graph by NN-descent (exact for small sets)
//! - [`build_exact`]: brute-force graph
//! - [`count_within`], [`is_within`], [`nearest_neighbor_radius`]: radius queries

mod descent;
mod exact;
mod graph;
mod neighbor;

#[cfg(test)]
mod graph_tests;

pub use descent::NeighborSearch;
pub use exact::{build_exact, count_within, is_within, nearest_neighbor_radius};
pub use graph::NeighborGraph;
pub use neighbor::Neighbor;
