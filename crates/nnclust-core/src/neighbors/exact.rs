//! Brute-force neighbor queries.

use super::graph::NeighborGraph;
use super::neighbor::Neighbor;
use crate::distance::DistanceMetric;
use crate::error::{try_filled, try_reserve, Error, Result};
use crate::executor::ParallelExecutor;
use crate::point_set::PointSet;

/// Checks `0 < k < n`.
pub(crate) fn validate_k(n: usize, k: usize) -> Result<()> {
    if k == 0 || k >= n {
        return Err(Error::invalid(format!(
            "k must satisfy 0 < k < n (k = {k}, n = {n})"
        )));
    }
    Ok(())
}

/// Builds the exact k-nearest-neighbor graph by comparing every pair.
///
/// Rows are computed independently per point, so the result does not depend
/// on the executor.
///
/// # Errors
///
/// - [`Error::InvalidInput`] unless `0 < k < n`
/// - [`Error::NumericError`] if a distance is not finite
/// - [`Error::OutOfMemory`] if a buffer cannot be reserved
pub fn build_exact<E: ParallelExecutor>(
    executor: &E,
    points: &PointSet<'_>,
    k: usize,
    metric: DistanceMetric,
) -> Result<NeighborGraph> {
    let n = points.len();
    validate_k(n, k)?;

    let mut entries = try_filled(n * k, Neighbor::EMPTY)?;
    executor.fill_slots(n, &mut entries, k, |part, slots| {
        let mut scratch = Vec::new();
        try_reserve(&mut scratch, n - 1)?;
        for (row, p) in slots.chunks_exact_mut(k).zip(part.range()) {
            scratch.clear();
            let origin = points.point(p);
            for q in (0..n).filter(|&q| q != p) {
                scratch.push(Neighbor::new(q, metric.checked(origin, points.point(q))?));
            }
            if k < scratch.len() {
                scratch.select_nth_unstable(k - 1);
            }
            let best = &mut scratch[..k];
            best.sort_unstable();
            row.copy_from_slice(best);
        }
        Ok(())
    })?;

    Ok(NeighborGraph::from_entries(n, k, entries))
}

/// The largest exact nearest-neighbor distance over all points.
///
/// Returns `0.0` for fewer than two points.
///
/// # Errors
///
/// Same as [`build_exact`].
pub fn nearest_neighbor_radius<E: ParallelExecutor>(
    executor: &E,
    points: &PointSet<'_>,
    metric: DistanceMetric,
) -> Result<f64> {
    if points.len() < 2 {
        return Ok(0.0);
    }
    Ok(build_exact(executor, points, 1, metric)?.nearest_neighbor_radius())
}

fn check_query(points: &PointSet<'_>, query: &[f64], radius: f64) -> Result<()> {
    if query.len() != points.dim() {
        return Err(Error::DimensionMismatch {
            expected: points.dim(),
            actual: query.len(),
        });
    }
    if query.iter().any(|x| !x.is_finite()) {
        return Err(Error::numeric("query has a non-finite coordinate"));
    }
    if !(radius >= 0.0 && radius.is_finite()) {
        return Err(Error::invalid(format!(
            "radius must be finite and non-negative, got {radius}"
        )));
    }
    Ok(())
}

/// Counts the points within `radius` (inclusive) of `query`.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `query` has the wrong dimension
/// - [`Error::InvalidInput`] for a negative or non-finite radius
/// - [`Error::NumericError`] for a non-finite query or distance
pub fn count_within(
    points: &PointSet<'_>,
    query: &[f64],
    radius: f64,
    metric: DistanceMetric,
) -> Result<usize> {
    check_query(points, query, radius)?;
    let mut count = 0;
    for p in 0..points.len() {
        if metric.checked(query, points.point(p))? <= radius {
            count += 1;
        }
    }
    Ok(count)
}

/// Returns true if any point lies within `radius` (inclusive) of `query`.
///
/// # Errors
///
/// Same as [`count_within`].
pub fn is_within(
    points: &PointSet<'_>,
    query: &[f64],
    radius: f64,
    metric: DistanceMetric,
) -> Result<bool> {
    check_query(points, query, radius)?;
    for p in 0..points.len() {
        if metric.checked(query, points.point(p))? <= radius {
            return Ok(true);
        }
    }
    Ok(false)
}
