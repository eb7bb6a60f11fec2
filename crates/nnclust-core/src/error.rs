//! Error types for `nnclust`.
//!
//! A single error type is shared by the neighbor search, the cluster engine
//! and the executors. Each variant maps onto one of the status codes that the
//! C ABI hands back to the host (see [`crate::status`]).

use crate::status::StatusCode;
use thiserror::Error;

/// Result type alias for `nnclust` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `nnclust` operations.
///
/// Error codes follow the pattern `NNC-XXX` for easy debugging.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad shape or parameter (NNC-001).
    #[error("[NNC-001] Invalid input: {0}")]
    InvalidInput(String),

    /// Buffer length does not match the declared shape (NNC-002).
    #[error("[NNC-002] Buffer length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Non-finite coordinate or computed distance (NNC-003).
    #[error("[NNC-003] Numeric error: {0}")]
    NumericError(String),

    /// Internal allocation failure (NNC-004).
    #[error("[NNC-004] Out of memory: failed to reserve {bytes} bytes")]
    OutOfMemory {
        /// Size of the failed reservation.
        bytes: usize,
    },

    /// Worker pool could not be started (NNC-005).
    #[error("[NNC-005] Thread pool error: {0}")]
    ThreadPool(String),

    /// Configuration error (NNC-006).
    #[error("[NNC-006] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "NNC-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "NNC-001",
            Self::DimensionMismatch { .. } => "NNC-002",
            Self::NumericError(_) => "NNC-003",
            Self::OutOfMemory { .. } => "NNC-004",
            Self::ThreadPool(_) => "NNC-005",
            Self::Config(_) => "NNC-006",
        }
    }

    /// Returns the status code reported across the C boundary.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::DimensionMismatch { .. } | Self::Config(_) => {
                StatusCode::InvalidInput
            }
            Self::NumericError(_) => StatusCode::NumericError,
            Self::OutOfMemory { .. } => StatusCode::OutOfMemory,
            Self::ThreadPool(_) => StatusCode::Internal,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn numeric(message: impl Into<String>) -> Self {
        Self::NumericError(message.into())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Allocates a vector with exactly `len` elements set to `value`, reporting
/// allocation failure as [`Error::OutOfMemory`] instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buffer.resize(len, value);
    Ok(buffer)
}

/// Reserves capacity for `additional` more elements, mapping failure to
/// [`Error::OutOfMemory`].
pub(crate) fn try_reserve<T>(buffer: &mut Vec<T>, additional: usize) -> Result<()> {
    buffer
        .try_reserve(additional)
        .map_err(|_| Error::OutOfMemory {
            bytes: additional.saturating_mul(std::mem::size_of::<T>()),
        })
}
