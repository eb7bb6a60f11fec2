//! # `nnclust` Core
//!
//! Deterministic k-nearest-neighbor graphs and density clustering over flat
//! point buffers, run serially or on a bounded worker pool.
//!
//! ## Features
//!
//! - **NN-descent**: approximate k-NN graphs by neighbor-of-neighbor joins,
//!   exact brute force for small sets
//! - **Density clustering**: DBSCAN-style labels from a k-NN graph, with a
//!   lock-free union-find
//! - **4 Distance Metrics**: Euclidean, Manhattan, Cosine, Chebyshev
//! - **Same answer on any thread count**: one algorithm written against
//!   [`ParallelExecutor`], serial and threaded executors interchangeable
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nnclust_core::{
//!     default_executor, ClusterEngine, DistanceMetric, NeighborSearch, PointSet, ThreadConfig,
//! };
//!
//! let points = PointSet::new(&data, n, d)?;
//! let executor = default_executor(ThreadConfig::Auto);
//!
//! // Approximate 10-NN graph
//! let graph =
//!     NeighborSearch::new(&executor).build(&points, 10, DistanceMetric::Euclidean, 10, 42)?;
//!
//! // Cluster, reusing the graph
//! let labels = ClusterEngine::new(&executor).cluster(&points, Some((&graph).into()), 0.5, 5)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// =============================================================================
// NUMERIC CAST LINTS
// =============================================================================
// Index/label conversions are bounds-checked on entry (n <= i32::MAX).
// For new code: Use try_from() or explicit bounds checks instead of `as`.
// =============================================================================
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
// =============================================================================
// STYLISTIC LINTS - Safe to allow globally (no bug risk)
// =============================================================================
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

pub mod cluster;
pub mod config;
pub mod distance;
pub mod error;
pub mod executor;
pub mod neighbors;
pub mod point_set;
pub mod status;
#[cfg(test)]
mod test_support;

pub use cluster::{
    BorderPolicy, ClusterAssignment, ClusterEngine, NeighborIndices, NeighborInput, NOISE,
};
pub use config::{ClusterConfig, ConfigError, ExecutorConfig, NeighborsConfig, NnclustConfig};
pub use distance::DistanceMetric;
pub use error::{Error, Result};
#[cfg(feature = "parallel")]
pub use executor::ThreadedExecutor;
pub use executor::{
    default_executor, is_parallel_build, partition, DefaultExecutor, ParallelExecutor,
    SerialExecutor, ThreadConfig, WorkPartition,
};
pub use neighbors::{
    build_exact, count_within, is_within, nearest_neighbor_radius, Neighbor, NeighborGraph,
    NeighborSearch,
};
pub use point_set::PointSet;
pub use status::{buffer_len, guard_call, host_slice, host_slice_mut, StatusCode};
