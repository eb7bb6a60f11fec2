//! Distance metrics for point-to-point comparisons.
//!
//! All metrics are true dissimilarities: symmetric, non-negative and lower
//! meaning closer, so neighbor lists sort ascending for every metric.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Distance metric used by the neighbor search and the cluster engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance (L2 norm).
    #[default]
    Euclidean,

    /// Manhattan distance (L1 norm).
    Manhattan,

    /// Cosine distance, `1 - cos θ`, clamped to `[0, 2]`.
    ///
    /// A zero vector is at distance 1 from any non-zero vector and at
    /// distance 0 from another zero vector.
    Cosine,

    /// Chebyshev distance (L∞ norm).
    Chebyshev,
}

impl DistanceMetric {
    /// Maps a C ABI metric id to a metric.
    ///
    /// Ids: 0 = euclidean, 1 = manhattan, 2 = cosine, 3 = chebyshev.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown id.
    pub fn from_id(id: i32) -> Result<Self> {
        match id {
            0 => Ok(Self::Euclidean),
            1 => Ok(Self::Manhattan),
            2 => Ok(Self::Cosine),
            3 => Ok(Self::Chebyshev),
            other => Err(Error::invalid(format!("unknown metric id {other}"))),
        }
    }

    /// Returns the C ABI id of this metric.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Euclidean => 0,
            Self::Manhattan => 1,
            Self::Cosine => 2,
            Self::Chebyshev => 3,
        }
    }

    /// Computes the distance between two points of equal dimension.
    ///
    /// Finite inputs can still overflow to infinity (e.g. Euclidean on
    /// coordinates near `f64::MAX`); callers check the result with
    /// [`DistanceMetric::checked`] where that matters.
    #[must_use]
    #[inline]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Self::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            Self::Cosine => cosine_distance(a, b),
            Self::Chebyshev => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
        }
    }

    /// Computes the distance and fails if it is not finite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NumericError`] when the distance is NaN or infinite.
    #[inline]
    pub fn checked(self, a: &[f64], b: &[f64]) -> Result<f64> {
        let dist = self.distance(a, b);
        if dist.is_finite() {
            Ok(dist)
        } else {
            Err(Error::numeric(format!(
                "{self:?} distance evaluated to {dist}"
            )))
        }
    }
}

fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    match (norm_a == 0.0, norm_b == 0.0) {
        (true, true) => 0.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => (1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 2.0),
    }
}
