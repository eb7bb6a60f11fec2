//! Multi-threaded executor backed by a per-call `rayon` pool.

use super::{ParallelExecutor, WorkPartition};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Runs one partition per worker on a scoped `rayon` pool.
///
/// The pool is built when [`ParallelExecutor::run`] is called and its
/// threads are joined before `run` returns; nothing outlives the call.
/// Inside [`ParallelExecutor::session`] every `run` reuses the session's
/// pool instead.
#[derive(Debug, Clone, Copy)]
pub struct ThreadedExecutor {
    threads: usize,
    /// Set only on the copy handed to a session body.
    pooled: bool,
}

impl ThreadedExecutor {
    /// Creates an executor with `threads` workers (at least one).
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            pooled: false,
        }
    }

    fn scoped_pool<R, F>(threads: usize, body: F) -> Result<R>
    where
        F: FnOnce(&rayon::ThreadPool) -> R,
    {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("nnclust-worker-{i}"))
            .build_scoped(|thread| thread.run(), body)
            .map_err(|e| Error::ThreadPool(e.to_string()))
    }
}

impl Default for ThreadedExecutor {
    fn default() -> Self {
        Self::new(super::ThreadConfig::Auto.effective_threads())
    }
}

impl ParallelExecutor for ThreadedExecutor {
    fn workers(&self) -> usize {
        self.threads
    }

    fn run<T, F>(&self, jobs: Vec<(WorkPartition, &mut [T])>, body: F) -> Result<()>
    where
        T: Send,
        F: Fn(WorkPartition, &mut [T]) -> Result<()> + Sync,
    {
        if jobs.is_empty() {
            return Ok(());
        }
        let job_count = jobs.len();
        let body = &body;
        let dispatch = move || -> Vec<Result<()>> {
            jobs.into_par_iter()
                .with_max_len(1)
                .map(|(part, slots)| body(part, slots))
                .collect()
        };

        // A session body already runs on a worker of the session pool
        let results = if self.pooled && rayon::current_thread_index().is_some() {
            dispatch()
        } else {
            let threads = self.threads.min(job_count);
            Self::scoped_pool(threads, |pool| pool.install(dispatch))?
        };

        // Collected in partition order, so this is the lowest-ordinal error.
        results.into_iter().collect()
    }

    fn session<R, F>(&self, body: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&Self) -> Result<R> + Send,
    {
        if self.pooled {
            return body(self);
        }
        let pooled = Self {
            threads: self.threads,
            pooled: true,
        };
        Self::scoped_pool(self.threads, |pool| pool.install(|| body(&pooled)))?
    }
}
