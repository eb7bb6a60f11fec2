//! Borrowed, validated view over a row-major point buffer.

use crate::error::{Error, Result};

/// `n` points of dimension `d`, stored row-major in a borrowed buffer of
/// length `n * d`.
///
/// Construction checks the shape and that every coordinate is finite, so the
/// kernels never see NaN or infinite coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a> {
    data: &'a [f64],
    len: usize,
    dim: usize,
}

impl<'a> PointSet<'a> {
    /// Wraps `data` as `n` points of dimension `dim`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `dim == 0` or `n * dim` overflows
    /// - [`Error::DimensionMismatch`] if `data.len() != n * dim`
    /// - [`Error::NumericError`] if any coordinate is not finite
    pub fn new(data: &'a [f64], n: usize, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::invalid("dimension must be at least 1"));
        }
        let expected = n
            .checked_mul(dim)
            .ok_or_else(|| Error::invalid(format!("n * d overflows ({n} * {dim})")))?;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        if let Some(pos) = data.iter().position(|x| !x.is_finite()) {
            return Err(Error::numeric(format!(
                "coordinate {} of point {} is {}",
                pos % dim,
                pos / dim,
                data[pos]
            )));
        }
        Ok(Self {
            data,
            len: n,
            dim,
        })
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension of each point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    #[inline]
    pub fn point(&self, index: usize) -> &'a [f64] {
        let start = index * self.dim;
        &self.data[start..start + self.dim]
    }

    /// The underlying flat buffer.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }
}
