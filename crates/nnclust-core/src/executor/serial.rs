//! Single-threaded executor.

use super::{ParallelExecutor, WorkPartition};
use crate::error::Result;

/// Runs every partition in order in the calling thread.
///
/// Behaves exactly like a threaded executor with one worker, so kernels can
/// be checked against it for parity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

impl ParallelExecutor for SerialExecutor {
    fn workers(&self) -> usize {
        1
    }

    fn run<T, F>(&self, jobs: Vec<(WorkPartition, &mut [T])>, body: F) -> Result<()>
    where
        T: Send,
        F: Fn(WorkPartition, &mut [T]) -> Result<()> + Sync,
    {
        for (part, slots) in jobs {
            body(part, slots)?;
        }
        Ok(())
    }
}
