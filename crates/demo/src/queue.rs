//! Bounded job queue with an injected backlog counter

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use n9e_metrics::Counter;
use parking_lot::Mutex;

/// A unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
}

/// Rolls above this take a job; the rest add one
const TAKE_THRESHOLD: f64 = 0.7;

/// FIFO of pending jobs
///
/// `pending` always equals the number of queued jobs; it is the counter the
/// reporter publishes.
#[derive(Debug)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    next_id: AtomicU64,
    capacity: usize,
    pending: Arc<Counter>,
}

impl JobQueue {
    pub fn new(capacity: usize, pending: Arc<Counter>) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::with_capacity(capacity)),
            next_id: AtomicU64::new(1),
            capacity,
            pending,
        }
    }

    /// Enqueue a new job; returns `None` when the queue is full
    pub fn submit(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock();
        if jobs.len() >= self.capacity {
            return None;
        }

        let job = Job {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        jobs.push_back(job);
        self.pending.inc();
        Some(job)
    }

    /// Dequeue the oldest job
    pub fn take(&self) -> Option<Job> {
        let job = self.jobs.lock().pop_front()?;
        self.pending.dec();
        Some(job)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// One producer/consumer step driven by a roll in `[0, 1)`
    pub fn step(&self, roll: f64) -> Step {
        if roll > TAKE_THRESHOLD {
            match self.take() {
                Some(job) => Step::Took(job),
                None => Step::Idle,
            }
        } else {
            match self.submit() {
                Some(job) => Step::Submitted(job),
                None => Step::Full,
            }
        }
    }
}

/// Outcome of [`JobQueue::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Submitted(Job),
    Took(Job),
    /// Wanted to take but nothing was queued
    Idle,
    /// Wanted to submit but the queue was at capacity
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(capacity: usize) -> (JobQueue, Arc<Counter>) {
        let pending = Arc::new(Counter::new());
        (JobQueue::new(capacity, Arc::clone(&pending)), pending)
    }

    #[test]
    fn test_counter_tracks_backlog() {
        let (queue, pending) = queue(10);

        queue.submit().unwrap();
        queue.submit().unwrap();
        queue.submit().unwrap();
        assert_eq!(pending.count(), 3);

        assert_eq!(queue.take(), Some(Job { id: 1 }));
        assert_eq!(pending.count(), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_bounded() {
        let (queue, pending) = queue(2);

        assert!(queue.submit().is_some());
        assert!(queue.submit().is_some());
        assert!(queue.submit().is_none());
        assert_eq!(pending.count(), 2);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let (queue, pending) = queue(1_000);
        let queue = Arc::new(queue);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| queue.submit().unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 400);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(pending.count(), 400);
    }

    #[test]
    fn test_take_from_empty_leaves_counter() {
        let (queue, pending) = queue(2);
        assert!(queue.take().is_none());
        assert!(queue.is_empty());
        assert_eq!(pending.count(), 0);
    }

    #[test]
    fn test_step_threshold() {
        let (queue, pending) = queue(1);

        assert_eq!(queue.step(0.9), Step::Idle);
        assert_eq!(queue.step(0.7), Step::Submitted(Job { id: 1 }));
        assert_eq!(queue.step(0.1), Step::Full);
        assert_eq!(queue.step(0.71), Step::Took(Job { id: 1 }));
        assert_eq!(pending.count(), 0);
    }
}
