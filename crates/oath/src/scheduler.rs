//! Deferred Invocation Queue
//!
//! FIFO job queue standing in for the host's microtask primitive. Jobs
//! never run inline in `defer`; the host (or a test) drains the queue with
//! `run_until_idle` or `tick`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A unit of deferred work
pub type Job = Box<dyn FnOnce() + Send>;

/// Cloneable handle to a shared job queue
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<VecDeque<Job>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `job` to run after the current synchronous work completes,
    /// ordered first-scheduled-first-run.
    pub fn defer<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.queue.lock().unwrap();
        queue.push_back(Box::new(job));
        tracing::trace!(pending = queue.len(), "job deferred");
    }

    fn next_job(&self) -> Option<Job> {
        self.queue.lock().unwrap().pop_front()
    }

    /// Drain the queue, including jobs enqueued by running jobs. Returns
    /// the number of jobs run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.next_job() {
            job();
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "queue drained");
        }
        ran
    }

    /// Run only the jobs queued when the pass began; jobs they enqueue
    /// wait for a later pass.
    pub fn tick(&self) -> usize {
        let batch = self.queue.lock().unwrap().len();
        let mut ran = 0;
        while ran < batch {
            match self.next_job() {
                Some(job) => job(),
                None => break,
            }
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, batch, "pass complete");
        }
        ran
    }

    pub fn pending_jobs(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn has_pending_work(&self) -> bool {
        self.pending_jobs() > 0
    }

    pub(crate) fn same_instance(&self, other: &Scheduler) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}
