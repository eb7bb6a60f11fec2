// C ABI - pedantic lints relaxed at the FFI boundary
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_name_repetitions)]

//! `cclustering` - density clustering over flat host buffers.
//!
//! Labels are written as `i32`: clusters are numbered `0, 1, ...` in index
//! order of their first core point, and noise is `-1`. Status codes and the
//! buffer contract are the same as `cneighbors`: the caller owns every
//! buffer, and `out_labels` is written only when the call succeeds.
//!
//! # Builds
//!
//! ```bash
//! cargo build --release -p cclustering                        # parallel
//! cargo build --release -p cclustering --no-default-features  # serial
//! ```

use nnclust_core::{
    buffer_len, default_executor, guard_call, host_slice, host_slice_mut, is_parallel_build,
    ClusterEngine, DistanceMetric, NeighborIndices, PointSet, Result, ThreadConfig,
};
use std::panic::AssertUnwindSafe;
use tracing::debug;


/// Clusters points under the euclidean metric with an automatically sized
/// pool.
///
/// Same as [`cluster_points_ex`] with `metric_id = 0` and `num_threads = 0`.
#[no_mangle]
pub unsafe extern "C" fn cluster_points(
    points: *const f64,
    n: usize,
    d: usize,
    epsilon: f64,
    min_points: usize,
    neighbor_indices: *const i64,
    k: usize,
    out_labels: *mut i32,
) -> i32 {
    // SAFETY: forwarded unchanged; same contract
    unsafe {
        cluster_points_ex(
            points,
            n,
            d,
            epsilon,
            min_points,
            0,
            neighbor_indices,
            k,
            0,
            out_labels,
        )
    }
}

/// Clusters points and writes one label per point to `out_labels`.
///
/// `neighbor_indices` is an optional `n * k` neighbor list (negative entries
/// are padding); when null, a graph is built internally and `k` is ignored.
/// `num_threads = 0` sizes the pool to the hardware; the serial build
/// ignores it.
///
/// # Safety
///
/// - `points` must be valid for `n * d` reads
/// - `neighbor_indices` must be null or valid for `n * k` reads
/// - `out_labels` must be valid for `n` writes
#[no_mangle]
pub unsafe extern "C" fn cluster_points_ex(
    points: *const f64,
    n: usize,
    d: usize,
    epsilon: f64,
    min_points: usize,
    metric_id: i32,
    neighbor_indices: *const i64,
    k: usize,
    num_threads: usize,
    out_labels: *mut i32,
) -> i32 {
    guard_call(
        "cluster_points",
        AssertUnwindSafe(|| -> Result<()> {
            let host_graph = !neighbor_indices.is_null();
            debug!(n, d, epsilon, min_points, metric_id, host_graph, num_threads, "cluster_points");
            // SAFETY: caller contract above
            let data = unsafe { host_slice(points, buffer_len(n, d)?, "points")? };
            let points = PointSet::new(data, n, d)?;
            let metric = DistanceMetric::from_id(metric_id)?;
            let graph = if host_graph {
                // SAFETY: non-null, valid for n * k reads per the contract
                let indices =
                    unsafe { host_slice(neighbor_indices, buffer_len(n, k)?, "neighbor_indices")? };
                Some(NeighborIndices::new(indices, n, k)?.into())
            } else {
                None
            };
            // SAFETY: caller contract above
            let out_labels = unsafe { host_slice_mut(out_labels, n, "out_labels")? };

            let executor = default_executor(ThreadConfig::from_count(num_threads));
            let assignment = ClusterEngine::new(executor)
                .with_metric(metric)
                .cluster(&points, graph, epsilon, min_points)?;
            assignment.write_into(out_labels)
        }),
    )
}

/// Returns `1` for the parallel build, `0` for the serial build.
#[no_mangle]
pub extern "C" fn cclustering_is_parallel() -> i32 {
    i32::from(is_parallel_build())
}
