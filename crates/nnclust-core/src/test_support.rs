//! Deterministic fixtures shared by unit tests.

/// Generates `n * dim` coordinates in `[-1, 1)` from a fixed LCG.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn generate_points(n: usize, dim: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n * dim)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
        })
        .collect()
}

/// Generates `blobs` tight groups of `per_blob` points around centers spaced
/// `spacing` apart on the first axis.
pub(crate) fn generate_blobs(blobs: usize, per_blob: usize, dim: usize, spacing: f64) -> Vec<f64> {
    let jitter = generate_points(blobs * per_blob, dim, 7);
    let mut data = Vec::with_capacity(jitter.len());
    for b in 0..blobs {
        for i in 0..per_blob {
            let row = (b * per_blob + i) * dim;
            for axis in 0..dim {
                let center = if axis == 0 { b as f64 * spacing } else { 0.0 };
                data.push(center + 0.1 * jitter[row + axis]);
            }
        }
    }
    data
}
