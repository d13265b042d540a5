//! # Next-turn scheduling.
//!
//! The driver never calls itself recursively: after a step suspends it hands a job to a
//! [`Schedule`] implementation, which runs it on a later turn after already queued work.
//!
//! Two implementations ship:
//! - [`TokioScheduler`] — every job becomes a tokio task on a captured runtime handle.
//! - [`TurnQueue`] — a FIFO queue the caller drains explicitly; deterministic, runtime-free.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//! use tasklet::{Schedule, TurnQueue};
//!
//! let queue = TurnQueue::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let h = Arc::clone(&hits);
//! queue.schedule(Box::new(move || { h.fetch_add(1, Ordering::SeqCst); }));
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//!
//! assert_eq!(queue.run_turn(), 1);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;

use crate::error::RuntimeError;

/// Deferred unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared scheduler handle.
pub type SchedulerRef = Arc<dyn Schedule>;

/// Runs a job on a later turn, after currently queued work (fire-and-forget, FIFO).
pub trait Schedule: Send + Sync + 'static {
    /// Queues `job`. Must not run it on the caller's stack.
    fn schedule(&self, job: Job);
}

/// Scheduler backed by a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Captures the runtime the caller is running in.
    pub fn current() -> Result<Self, RuntimeError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|_| RuntimeError::NoScheduler)
    }

    /// Uses the given runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Schedule for TokioScheduler {
    fn schedule(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }
}

/// Manually driven FIFO scheduler.
///
/// [`run_turn`](TurnQueue::run_turn) runs exactly the jobs queued before the call; jobs they
/// schedule wait for the next turn.
#[derive(Clone, Default)]
pub struct TurnQueue {
    jobs: Arc<Mutex<VecDeque<Job>>>,
}

impl TurnQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Runs one turn. Returns the number of jobs run.
    pub fn run_turn(&self) -> usize {
        let batch: Vec<Job> = self.lock().drain(..).collect();
        let n = batch.len();
        for job in batch {
            job();
        }
        n
    }

    /// Runs up to `max` turns, stopping early when idle. Returns the number of turns run.
    pub fn run_turns(&self, max: usize) -> usize {
        let mut turns = 0;
        while turns < max && self.run_turn() > 0 {
            turns += 1;
        }
        turns
    }

    /// Runs turns until the queue is empty. Returns the number of turns run.
    ///
    /// Does not return while a computation keeps suspending.
    pub fn run_until_idle(&self) -> usize {
        self.run_turns(usize::MAX)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Schedule for TurnQueue {
    fn schedule(&self, job: Job) {
        self.lock().push_back(job);
    }
}

impl fmt::Debug for TurnQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnQueue")
            .field("queued", &self.len())
            .finish()
    }
}
