//! Status codes returned across the C boundary.
//!
//! Every entry point validates before doing work and reports failure as one
//! of these codes; no panic or Rust error type ever crosses into the host.

use crate::error::{Error, Result};

/// Outcome of a C ABI call.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// The call completed and all output buffers were written.
    Success = 0,
    /// Bad shape or parameter, or a null required pointer.
    InvalidInput = 1,
    /// Non-finite coordinate or computed distance.
    NumericError = 2,
    /// Internal allocation failure.
    OutOfMemory = 3,
    /// Worker pool failure or a caught panic.
    Internal = 4,
}

impl StatusCode {
    /// Returns the raw `i32` handed to the host.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Maps a raw status back to its variant.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Success),
            1 => Some(Self::InvalidInput),
            2 => Some(Self::NumericError),
            3 => Some(Self::OutOfMemory),
            4 => Some(Self::Internal),
            _ => None,
        }
    }
}

impl<T> From<&Result<T>> for StatusCode {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err.status(),
        }
    }
}

/// Runs an entry point body, converting its result and any panic into a raw
/// status code.
///
/// The body must only write to host buffers once the whole computation has
/// succeeded, so an error or panic leaves them untouched.
pub fn guard_call<F>(entry: &'static str, body: F) -> i32
where
    F: FnOnce() -> Result<()> + std::panic::UnwindSafe,
{
    match std::panic::catch_unwind(body) {
        Ok(Ok(())) => StatusCode::Success.as_raw(),
        Ok(Err(err)) => {
            tracing::debug!(entry, code = err.code(), error = %err, "call failed");
            err.status().as_raw()
        }
        Err(_) => {
            tracing::error!(entry, "panic caught at C boundary");
            StatusCode::Internal.as_raw()
        }
    }
}

/// Borrows a host input buffer of `len` elements.
///
/// A null pointer is accepted only when `len == 0`.
///
/// # Safety
///
/// Unless null, `ptr` must be valid for reads of `len` elements for `'a`,
/// and the memory must not be written during that time.
pub unsafe fn host_slice<'a, T>(ptr: *const T, len: usize, name: &str) -> Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Error::invalid(format!("{name} is null")));
    }
    // SAFETY: non-null and valid for `len` reads per the caller contract
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Borrows a host output buffer of `len` elements.
///
/// A null pointer is accepted only when `len == 0`.
///
/// # Safety
///
/// Unless null, `ptr` must be valid for reads and writes of `len` elements
/// for `'a` and must not alias any other buffer passed to the same call.
pub unsafe fn host_slice_mut<'a, T>(ptr: *mut T, len: usize, name: &str) -> Result<&'a mut [T]> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(Error::invalid(format!("{name} is null")));
    }
    // SAFETY: non-null, valid and unaliased for `len` elements per the caller contract
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

/// Computes `a * b` for a buffer length, rejecting overflow.
pub fn buffer_len(a: usize, b: usize) -> Result<usize> {
    a.checked_mul(b)
        .ok_or_else(|| Error::invalid(format!("buffer length overflows ({a} * {b})")))
}
