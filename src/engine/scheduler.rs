//! Work-stealing scheduler for independent runs.
//!
//! Implements Heijunka (load leveling) for runs of uneven duration: a run
//! whose forager keeps aborting finishes quickly, a run that rarely aborts
//! takes longer. Idle workers steal pending runs from the global queue or
//! from each other, so no thread waits on a straggler.
//!
//! Results are returned in task order, so the output is identical to
//! sequential execution.

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use std::sync::Mutex;

/// Work-stealing executor over task indices `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkStealingScheduler {
    num_workers: usize,
}

impl Default for WorkStealingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkStealingScheduler {
    /// Create with default number of workers (number of CPUs).
    #[must_use]
    pub fn new() -> Self {
        Self {
            num_workers: std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(4),
        }
    }

    /// Create with specified number of workers (at least one).
    #[must_use]
    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    /// Get number of workers.
    #[must_use]
    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Run `task(i)` for every `i` in `0..n` and return results by index.
    pub fn execute<F, R>(&self, n: usize, task: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync,
        R: Send,
    {
        let injector: Injector<usize> = Injector::new();
        for index in 0..n {
            injector.push(index);
        }

        let workers: Vec<Worker<usize>> = (0..self.num_workers.min(n.max(1)))
            .map(|_| Worker::new_fifo())
            .collect();
        let stealers: Vec<Stealer<usize>> = workers.iter().map(Worker::stealer).collect();

        let results: Mutex<Vec<(usize, R)>> = Mutex::new(Vec::with_capacity(n));

        std::thread::scope(|s| {
            for (worker_id, worker) in workers.into_iter().enumerate() {
                let injector = &injector;
                let stealers = &stealers;
                let results = &results;
                let task = &task;

                s.spawn(move || {
                    while let Some(index) = find_task(worker_id, &worker, injector, stealers) {
                        let result = task(index);
                        if let Ok(mut guard) = results.lock() {
                            guard.push((index, result));
                        }
                    }
                });
            }
        });

        let mut indexed = results.into_inner().unwrap_or_default();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, r)| r).collect()
    }
}

/// Local queue first, then the global queue, then the other workers.
fn find_task(
    worker_id: usize,
    local: &Worker<usize>,
    injector: &Injector<usize>,
    stealers: &[Stealer<usize>],
) -> Option<usize> {
    if let Some(index) = local.pop() {
        return Some(index);
    }
    loop {
        match injector.steal_batch_and_pop(local) {
            Steal::Success(index) => return Some(index),
            Steal::Empty => break,
            Steal::Retry => {}
        }
    }
    for offset in 1..stealers.len() {
        let victim = &stealers[(worker_id + offset) % stealers.len()];
        loop {
            match victim.steal() {
                Steal::Success(index) => return Some(index),
                Steal::Empty => break,
                Steal::Retry => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_index_order() {
        let scheduler = WorkStealingScheduler::with_workers(4);
        let results = scheduler.execute(100, |i| i * i);
        let expected: Vec<usize> = (0..100).map(|i| i * i).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_zero_tasks() {
        let scheduler = WorkStealingScheduler::with_workers(3);
        let results: Vec<usize> = scheduler.execute(0, |i| i);
        assert!(results.is_empty());
    }

    #[test]
    fn test_single_worker() {
        let scheduler = WorkStealingScheduler::with_workers(0);
        assert_eq!(scheduler.num_workers(), 1);
        assert_eq!(scheduler.execute(5, |i| i + 1), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_default_has_workers() {
        assert!(WorkStealingScheduler::default().num_workers() >= 1);
    }
}
