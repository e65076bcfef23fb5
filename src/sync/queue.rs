//! A fixed-pool work queue with a quiescence barrier.
//!
//! Workers are plain OS threads parked on a condvar over an unbounded FIFO.
//! The `pending` counter lives behind its own mutex, separate from the task
//! queue's, so [`WorkQueue::finish`] can wait for "everything submitted has
//! run" without contending with task hand-off.
//!
//! Shutdown is drain-and-abandon: workers exit after the task they are
//! currently running, and anything still sitting in the queue is dropped
//! unexecuted. The pipelines here always call `finish()` first, so nothing is
//! lost in practice; the behavior is still worth knowing about when reusing
//! the type.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::error;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Worker count used when the caller does not specify one.
pub const DEFAULT_THREADS: usize = 5;

struct QueueInner {
    queue: Mutex<VecDeque<Task>>,
    /// Signaled on submit and on shutdown.
    available: Condvar,
    pending: Mutex<usize>,
    /// Signaled when `pending` drops to zero.
    idle: Condvar,
    shutdown: AtomicBool,
}

/// A fixed pool of worker threads executing submitted closures FIFO.
pub struct WorkQueue {
    inner: Arc<QueueInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkQueue {
    /// Starts a queue with [`DEFAULT_THREADS`] workers.
    pub fn new() -> Self {
        Self::with_threads(DEFAULT_THREADS)
    }

    /// Starts a queue with `threads` workers waiting in the background.
    pub fn with_threads(threads: usize) -> Self {
        let inner = Arc::new(QueueInner {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            pending: Mutex::new(0),
            idle: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let workers = (0..threads.max(1))
            .map(|i| {
                let inner = Arc::clone(&inner);
                std::thread::Builder::new()
                    .name(format!("quarry-worker-{i}"))
                    .spawn(move || worker_loop(inner))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkQueue {
            inner,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueues a task. A worker picks it up when one is free.
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        {
            let mut pending = self.inner.pending.lock().unwrap();
            *pending += 1;
        }
        {
            let mut queue = self.inner.queue.lock().unwrap();
            queue.push_back(Box::new(task));
        }
        self.inner.available.notify_all();
    }

    /// Blocks until every submitted task has finished running.
    ///
    /// Tasks submitted *by* running tasks count too: `pending` is incremented
    /// at submission, so the barrier cannot pass while any chain of work is
    /// still growing.
    pub fn finish(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        while *pending > 0 {
            pending = self.inner.idle.wait(pending).unwrap();
        }
    }

    /// Asks workers to exit after their current task and joins them.
    ///
    /// Queued-but-unstarted tasks are abandoned. Call [`WorkQueue::finish`]
    /// first when that matters. Must not be called from a worker thread.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        self.inner.available.notify_all();

        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        for worker in workers {
            if worker.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.lock().unwrap().len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(inner: Arc<QueueInner>) {
    loop {
        let task = {
            let mut queue = inner.queue.lock().unwrap();
            loop {
                // Shutdown wins even when work remains queued.
                if inner.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(task) = queue.pop_front() {
                    break task;
                }
                queue = inner.available.wait(queue).unwrap();
            }
        };

        // A panicking task must neither take down the worker nor skip the
        // pending decrement, or finish() would hang forever.
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!("work queue task panicked; worker continuing");
        }

        let mut pending = inner.pending.lock().unwrap();
        *pending -= 1;
        if *pending == 0 {
            inner.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn runs_every_submitted_task() {
        let queue = WorkQueue::with_threads(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            queue.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.finish();
        queue.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn finish_waits_for_slow_tasks() {
        let queue = WorkQueue::with_threads(2);
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let done = Arc::clone(&done);
            queue.execute(move || {
                std::thread::sleep(Duration::from_millis(25));
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.finish();
        assert_eq!(done.load(Ordering::SeqCst), 4);
        queue.shutdown();
    }

    #[test]
    fn finish_counts_tasks_submitted_by_tasks() {
        let queue = Arc::new(WorkQueue::with_threads(3));
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_queue = Arc::clone(&queue);
        let inner_counter = Arc::clone(&counter);
        queue.execute(move || {
            inner_counter.fetch_add(1, Ordering::SeqCst);
            for _ in 0..5 {
                let counter = Arc::clone(&inner_counter);
                inner_queue.execute(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), 6);
        queue.shutdown();
    }

    #[test]
    fn panicking_task_does_not_wedge_the_queue() {
        let queue = WorkQueue::with_threads(1);
        let counter = Arc::new(AtomicUsize::new(0));

        queue.execute(|| panic!("boom"));
        let after = Arc::clone(&counter);
        queue.execute(move || {
            after.fetch_add(1, Ordering::SeqCst);
        });

        queue.finish();
        queue.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let queue = WorkQueue::with_threads(2);
        queue.finish();
        queue.shutdown();
        queue.shutdown();
        assert_eq!(queue.size(), 0);
    }
}
