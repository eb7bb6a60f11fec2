//! Parallel execution over index ranges.
//!
//! Both kernels are written once against the [`ParallelExecutor`] trait.
//! [`SerialExecutor`] runs every partition in the calling thread,
//! [`ThreadedExecutor`] (feature `parallel`) runs one partition per worker of
//! a pool that lives only for the duration of the call. Because the kernels
//! only ever write to slots owned by the current partition and read from
//! immutable snapshots, the two produce identical output.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │  partition(n, workers) -> [WorkPartition] │
//! ├───────────────────────────────────────────┤
//! │  ParallelExecutor::run(jobs, body)        │
//! │  ParallelExecutor::session(body)          │
//! │   ├─ SerialExecutor     (in order)        │
//! │   └─ ThreadedExecutor   (rayon, scoped)   │
//! └───────────────────────────────────────────┘
//! ```

mod serial;
#[cfg(feature = "parallel")]
mod threaded;

#[cfg(test)]
mod tests;

pub use serial::SerialExecutor;
#[cfg(feature = "parallel")]
pub use threaded::ThreadedExecutor;

use crate::error::{Error, Result};
use std::ops::Range;

/// A contiguous sub-range `[lo, hi)` of point indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkPartition {
    /// Ordinal of this partition (0-based, ascending with `lo`).
    pub index: usize,
    /// First index (inclusive).
    pub lo: usize,
    /// Last index (exclusive).
    pub hi: usize,
}

impl WorkPartition {
    /// Number of indices in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// Returns true if the partition holds no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hi == self.lo
    }

    /// The index range as a `Range`.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.lo..self.hi
    }
}

/// Splits `[0, n)` into `min(workers, n)` partitions whose sizes differ by
/// at most one. The first `n % parts` partitions take the extra index.
///
/// Returns no partitions when `n == 0`; `workers == 0` is treated as one.
#[must_use]
pub fn partition(n: usize, workers: usize) -> Vec<WorkPartition> {
    if n == 0 {
        return Vec::new();
    }
    let parts = workers.clamp(1, n);
    let base = n / parts;
    let extra = n % parts;

    let mut partitions = Vec::with_capacity(parts);
    let mut lo = 0;
    for index in 0..parts {
        let len = base + usize::from(index < extra);
        partitions.push(WorkPartition {
            index,
            lo,
            hi: lo + len,
        });
        lo += len;
    }
    partitions
}

/// Worker count selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadConfig {
    /// Use the hardware parallelism reported by the OS.
    #[default]
    Auto,
    /// Use a fixed number of workers.
    Fixed(usize),
}

impl ThreadConfig {
    /// Maps a raw count to a config: `0` means auto.
    #[must_use]
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::Auto
        } else {
            Self::Fixed(count)
        }
    }

    /// Returns the effective number of workers (always at least one).
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        match self {
            Self::Auto | Self::Fixed(0) => std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1),
            Self::Fixed(n) => *n,
        }
    }
}

/// Strategy for running per-partition work.
///
/// Implementors only provide [`ParallelExecutor::run`]; every other
/// operation is expressed in terms of it so that swapping executors never
/// changes what the kernels compute.
pub trait ParallelExecutor: Send + Sync {
    /// Number of partitions this executor splits work into.
    fn workers(&self) -> usize;

    /// Runs `body` once per job and blocks until all jobs finish.
    ///
    /// Each job pairs a partition with the output slots it exclusively owns.
    /// If several jobs fail, the error of the lowest-ordinal partition is
    /// returned.
    fn run<T, F>(&self, jobs: Vec<(WorkPartition, &mut [T])>, body: F) -> Result<()>
    where
        T: Send,
        F: Fn(WorkPartition, &mut [T]) -> Result<()> + Sync;

    /// Runs `body` with an executor whose `run` calls all share one set of
    /// workers, for kernels that dispatch several rounds.
    ///
    /// The default hands `self` straight to `body`. Workers created for the
    /// session are joined before `session` returns.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or [`Error::ThreadPool`] if workers
    /// cannot be started.
    fn session<R, F>(&self, body: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&Self) -> Result<R> + Send,
    {
        body(self)
    }

    /// Runs `body` once for each partition of `[0, n)`.
    fn for_each_partition<F>(&self, n: usize, body: F) -> Result<()>
    where
        F: Fn(WorkPartition) -> Result<()> + Sync,
    {
        let jobs: Vec<(WorkPartition, &mut [()])> = partition(n, self.workers())
            .into_iter()
            .map(|part| (part, <&mut [()]>::default()))
            .collect();
        self.run(jobs, |part, _| body(part))
    }

    /// Runs `body` once for each index of `[0, n)`.
    fn for_each_index<F>(&self, n: usize, body: F) -> Result<()>
    where
        F: Fn(usize) -> Result<()> + Sync,
    {
        self.for_each_partition(n, |part| part.range().try_for_each(&body))
    }

    /// Splits `slots` (`n` rows of `stride` values) by partition and hands
    /// each worker only the rows of its own indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `slots.len() != n * stride`,
    /// or the first error returned by `body`.
    fn fill_slots<T, F>(&self, n: usize, slots: &mut [T], stride: usize, body: F) -> Result<()>
    where
        T: Send,
        F: Fn(WorkPartition, &mut [T]) -> Result<()> + Sync,
    {
        let expected = n.saturating_mul(stride);
        if slots.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: slots.len(),
            });
        }

        let parts = partition(n, self.workers());
        let mut jobs = Vec::with_capacity(parts.len());
        let mut rest = slots;
        for part in parts {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(part.len() * stride);
            jobs.push((part, head));
            rest = tail;
        }
        self.run(jobs, body)
    }
}

impl<E: ParallelExecutor> ParallelExecutor for &E {
    fn workers(&self) -> usize {
        (**self).workers()
    }

    fn run<T, F>(&self, jobs: Vec<(WorkPartition, &mut [T])>, body: F) -> Result<()>
    where
        T: Send,
        F: Fn(WorkPartition, &mut [T]) -> Result<()> + Sync,
    {
        (**self).run(jobs, body)
    }

    fn session<R, F>(&self, body: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&Self) -> Result<R> + Send,
    {
        (**self).session(|inner| body(&inner))
    }
}

/// Executor selected at build time: threaded with the `parallel` feature,
/// serial otherwise.
#[cfg(feature = "parallel")]
pub type DefaultExecutor = ThreadedExecutor;

/// Executor selected at build time: threaded with the `parallel` feature,
/// serial otherwise.
#[cfg(not(feature = "parallel"))]
pub type DefaultExecutor = SerialExecutor;

/// Creates the build's default executor.
///
/// The serial build ignores `threads`.
#[must_use]
pub fn default_executor(threads: ThreadConfig) -> DefaultExecutor {
    #[cfg(feature = "parallel")]
    {
        ThreadedExecutor::new(threads.effective_threads())
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = threads;
        SerialExecutor
    }
}

/// Returns true when this build runs work on multiple threads.
#[must_use]
pub const fn is_parallel_build() -> bool {
    cfg!(feature = "parallel")
}
