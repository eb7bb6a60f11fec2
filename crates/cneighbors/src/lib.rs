// C ABI - pedantic lints relaxed at the FFI boundary
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_name_repetitions)]

//! `cneighbors` - k-nearest-neighbor graphs over flat host buffers.
//!
//! Every entry point returns an `i32` status (`0` success, `1` invalid input,
//! `2` numeric error, `3` out of memory, `4` internal). The caller allocates
//! and frees every buffer; outputs are written only when the whole call
//! succeeds, and no pointer is kept after return.
//!
//! # Builds
//!
//! ```bash
//! # Parallel artifact
//! cargo build --release -p cneighbors
//! # Serial artifact, identical signatures and outputs
//! cargo build --release -p cneighbors --no-default-features
//! ```
//!
//! # Metric ids
//!
//! `0` euclidean, `1` manhattan, `2` cosine, `3` chebyshev.

use nnclust_core::{
    buffer_len, default_executor, guard_call, host_slice, host_slice_mut, is_parallel_build,
    DistanceMetric, NeighborSearch, PointSet, Result, ThreadConfig,
};
use std::panic::AssertUnwindSafe;
use tracing::debug;


/// Builds an approximate k-NN graph with an automatically sized pool.
///
/// Same as [`build_neighbors_threads`] with `num_threads = 0`.
#[no_mangle]
pub unsafe extern "C" fn build_neighbors(
    points: *const f64,
    n: usize,
    d: usize,
    k: usize,
    metric_id: i32,
    max_iterations: usize,
    seed: u64,
    out_indices: *mut i64,
    out_distances: *mut f64,
) -> i32 {
    // SAFETY: forwarded unchanged; same contract
    unsafe {
        build_neighbors_threads(
            points,
            n,
            d,
            k,
            metric_id,
            max_iterations,
            seed,
            0,
            out_indices,
            out_distances,
        )
    }
}

/// Builds an approximate k-NN graph.
///
/// Writes `n * k` neighbor indices and distances, row `p` holding the
/// neighbors of point `p` by ascending distance (ties by index).
/// `num_threads = 0` sizes the pool to the hardware; the serial build
/// ignores it.
///
/// # Safety
///
/// - `points` must be valid for `n * d` reads
/// - `out_indices` and `out_distances` must each be valid for `n * k` writes
///   and must not overlap
#[no_mangle]
pub unsafe extern "C" fn build_neighbors_threads(
    points: *const f64,
    n: usize,
    d: usize,
    k: usize,
    metric_id: i32,
    max_iterations: usize,
    seed: u64,
    num_threads: usize,
    out_indices: *mut i64,
    out_distances: *mut f64,
) -> i32 {
    guard_call(
        "build_neighbors",
        AssertUnwindSafe(|| -> Result<()> {
            debug!(n, d, k, metric_id, max_iterations, num_threads, "build_neighbors");
            // SAFETY: caller contract above
            let data = unsafe { host_slice(points, buffer_len(n, d)?, "points")? };
            let points = PointSet::new(data, n, d)?;
            let metric = DistanceMetric::from_id(metric_id)?;
            let len = buffer_len(n, k)?;
            // SAFETY: caller contract above
            let out_indices = unsafe { host_slice_mut(out_indices, len, "out_indices")? };
            // SAFETY: caller contract above
            let out_distances = unsafe { host_slice_mut(out_distances, len, "out_distances")? };

            let executor = default_executor(ThreadConfig::from_count(num_threads));
            let graph =
                NeighborSearch::new(executor).build(&points, k, metric, max_iterations, seed)?;
            graph.write_into(out_indices, out_distances)
        }),
    )
}

/// Writes the largest exact nearest-neighbor distance over all points to
/// `out_radius` (`0.0` for fewer than two points).
///
/// # Safety
///
/// `points` must be valid for `n * d` reads and `out_radius` for one write.
#[no_mangle]
pub unsafe extern "C" fn nearest_neighbor_radius(
    points: *const f64,
    n: usize,
    d: usize,
    metric_id: i32,
    out_radius: *mut f64,
) -> i32 {
    guard_call(
        "nearest_neighbor_radius",
        AssertUnwindSafe(|| -> Result<()> {
            // SAFETY: caller contract above
            let data = unsafe { host_slice(points, buffer_len(n, d)?, "points")? };
            let points = PointSet::new(data, n, d)?;
            let metric = DistanceMetric::from_id(metric_id)?;
            // SAFETY: caller contract above
            let out = unsafe { host_slice_mut(out_radius, 1, "out_radius")? };

            let executor = default_executor(ThreadConfig::Auto);
            out[0] = nnclust_core::nearest_neighbor_radius(&executor, &points, metric)?;
            Ok(())
        }),
    )
}

/// Writes the number of points within `radius` (inclusive) of `query` to
/// `out_count`.
///
/// # Safety
///
/// `points` must be valid for `n * d` reads, `query` for `d` reads and
/// `out_count` for one write.
#[no_mangle]
pub unsafe extern "C" fn count_within_distance(
    points: *const f64,
    n: usize,
    d: usize,
    query: *const f64,
    radius: f64,
    metric_id: i32,
    out_count: *mut usize,
) -> i32 {
    guard_call(
        "count_within_distance",
        AssertUnwindSafe(|| -> Result<()> {
            // SAFETY: caller contract above
            let data = unsafe { host_slice(points, buffer_len(n, d)?, "points")? };
            let points = PointSet::new(data, n, d)?;
            // SAFETY: caller contract above
            let query = unsafe { host_slice(query, d, "query")? };
            let metric = DistanceMetric::from_id(metric_id)?;
            // SAFETY: caller contract above
            let out = unsafe { host_slice_mut(out_count, 1, "out_count")? };

            out[0] = nnclust_core::count_within(&points, query, radius, metric)?;
            Ok(())
        }),
    )
}

/// Returns `1` for the parallel build, `0` for the serial build.
#[no_mangle]
pub extern "C" fn cneighbors_is_parallel() -> i32 {
    i32::from(is_parallel_build())
}
