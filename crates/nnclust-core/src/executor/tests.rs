//! Tests for the executor module.

use super::*;
use crate::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

// =========================================================================
// partition()
// =========================================================================

#[test]
fn test_partition_empty_range() {
    assert!(partition(0, 4).is_empty());
}

#[test]
fn test_partition_sizes_differ_by_at_most_one() {
    let parts = partition(10, 3);

    let sizes: Vec<usize> = parts.iter().map(WorkPartition::len).collect();
    assert_eq!(sizes, vec![4, 3, 3]);
    assert_eq!(parts[0].range(), 0..4);
    assert_eq!(parts[2].range(), 7..10);
}

#[test]
fn test_partition_more_workers_than_indices() {
    let parts = partition(3, 8);

    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|p| p.len() == 1));
}

#[test]
fn test_partition_zero_workers_means_one() {
    let parts = partition(5, 0);
    assert_eq!(parts, vec![WorkPartition { index: 0, lo: 0, hi: 5 }]);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: partitions are disjoint, ordered and cover [0, n)
        #[test]
        fn prop_partitions_cover_range(n in 0usize..500, workers in 0usize..32) {
            let parts = partition(n, workers);
            let mut next = 0;
            for (i, part) in parts.iter().enumerate() {
                prop_assert_eq!(part.index, i);
                prop_assert_eq!(part.lo, next);
                prop_assert!(!part.is_empty());
                next = part.hi;
            }
            prop_assert_eq!(next, n);

            if let (Some(min), Some(max)) = (
                parts.iter().map(WorkPartition::len).min(),
                parts.iter().map(WorkPartition::len).max(),
            ) {
                prop_assert!(max - min <= 1);
            }
        }
    }
}

// =========================================================================
// ThreadConfig
// =========================================================================

#[test]
fn test_thread_config_from_count() {
    assert_eq!(ThreadConfig::from_count(0), ThreadConfig::Auto);
    assert_eq!(ThreadConfig::from_count(3), ThreadConfig::Fixed(3));
    assert_eq!(ThreadConfig::Fixed(3).effective_threads(), 3);
    assert!(ThreadConfig::Auto.effective_threads() >= 1);
    assert!(ThreadConfig::Fixed(0).effective_threads() >= 1);
}

// =========================================================================
// Executors
// =========================================================================

fn squares_with<E: ParallelExecutor>(executor: &E, n: usize) -> Vec<usize> {
    let mut out = vec![0usize; n * 2];
    executor
        .fill_slots(n, &mut out, 2, |part, slots| {
            for (offset, i) in part.range().enumerate() {
                slots[offset * 2] = i;
                slots[offset * 2 + 1] = i * i;
            }
            Ok(())
        })
        .expect("fill succeeds");
    out
}

#[test]
fn test_serial_fill_slots() {
    let out = squares_with(&SerialExecutor, 4);
    assert_eq!(out, vec![0, 0, 1, 1, 2, 4, 3, 9]);
}

#[test]
fn test_fill_slots_rejects_wrong_length() {
    let mut out = vec![0u8; 5];
    let err = SerialExecutor
        .fill_slots(3, &mut out, 2, |_, _| Ok(()))
        .unwrap_err();
    assert_eq!(
        err,
        Error::DimensionMismatch {
            expected: 6,
            actual: 5
        }
    );
}

#[test]
fn test_for_each_index_visits_every_index_once() {
    let hits: Vec<AtomicUsize> = (0..37).map(|_| AtomicUsize::new(0)).collect();
    SerialExecutor
        .for_each_index(hits.len(), |i| {
            hits[i].fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .expect("no errors");
    assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
}

#[test]
fn test_serial_stops_at_first_error() {
    let err = SerialExecutor
        .for_each_index(10, |i| {
            if i >= 3 {
                Err(Error::invalid(format!("index {i}")))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
    assert_eq!(err, Error::InvalidInput("index 3".into()));
}

#[test]
fn test_serial_session_runs_in_caller() {
    let caller = std::thread::current().id();
    let out = SerialExecutor
        .session(|executor| {
            assert_eq!(std::thread::current().id(), caller);
            Ok(squares_with(executor, 4))
        })
        .expect("session");
    assert_eq!(out, squares_with(&SerialExecutor, 4));
}

#[test]
fn test_default_executor_matches_build() {
    let executor = default_executor(ThreadConfig::Fixed(2));
    if is_parallel_build() {
        assert_eq!(executor.workers(), 2);
    } else {
        assert_eq!(executor.workers(), 1);
    }
}

#[cfg(feature = "parallel")]
mod threaded_tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    #[test]
    fn test_threaded_matches_serial() {
        for threads in [1, 2, 3, 8] {
            let executor = ThreadedExecutor::new(threads);
            assert_eq!(squares_with(&executor, 101), squares_with(&SerialExecutor, 101));
        }
    }

    #[test]
    fn test_threaded_for_each_index_covers_range() {
        let executor = ThreadedExecutor::new(4);
        let hits: Vec<AtomicUsize> = (0..1000).map(|_| AtomicUsize::new(0)).collect();
        executor
            .for_each_index(hits.len(), |i| {
                hits[i].fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .expect("no errors");
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_threaded_reports_lowest_partition_error() {
        let executor = ThreadedExecutor::new(4);
        let err = executor
            .for_each_partition(40, |part| {
                if part.index >= 1 {
                    Err(Error::invalid(format!("partition {}", part.index)))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert_eq!(err, Error::InvalidInput("partition 1".into()));
    }

    #[test]
    fn test_threaded_zero_threads_clamped() {
        assert_eq!(ThreadedExecutor::new(0).workers(), 1);
    }

    #[test]
    fn test_threaded_empty_range() {
        let executor = ThreadedExecutor::new(4);
        executor
            .for_each_index(0, |_| Err(Error::invalid("never called")))
            .expect("nothing to run");
    }

    /// Records the worker threads used by `rounds` dispatches of 40 indices.
    fn worker_ids<E: ParallelExecutor>(executor: &E, rounds: usize) -> HashSet<ThreadId> {
        let ids = Mutex::new(HashSet::new());
        for _ in 0..rounds {
            executor
                .for_each_partition(40, |_| {
                    ids.lock().expect("lock").insert(std::thread::current().id());
                    Ok(())
                })
                .expect("no errors");
        }
        ids.into_inner().expect("lock")
    }

    #[test]
    fn test_session_reuses_one_pool_across_runs() {
        let executor = ThreadedExecutor::new(3);

        let ids = executor
            .session(|pooled| Ok(worker_ids(pooled, 6)))
            .expect("session");

        assert!(!ids.is_empty());
        assert!(ids.len() <= 3, "{} distinct workers", ids.len());
    }

    #[test]
    fn test_runs_outside_session_get_their_own_pool() {
        let executor = ThreadedExecutor::new(2);

        let ids = worker_ids(&executor, 4);

        assert!(ids.len() >= 4, "{} distinct workers", ids.len());
    }

    #[test]
    fn test_nested_session_and_output() {
        let executor = ThreadedExecutor::new(4);

        let out = executor
            .session(|outer| outer.session(|inner| Ok(squares_with(inner, 101))))
            .expect("session");

        assert_eq!(out, squares_with(&SerialExecutor, 101));
    }

    #[test]
    fn test_session_propagates_body_error() {
        let err = ThreadedExecutor::new(2)
            .session(|_| Err::<(), _>(Error::invalid("stop")))
            .unwrap_err();
        assert_eq!(err, Error::InvalidInput("stop".into()));
    }
}
