//! Fixed-size worker pool draining a shared [`SynchronizedQueue`].

use foundation_taskqueue::{QueueConfig, SynchronizedQueue};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Stop,
}

/// A worker pool whose jobs are tracked by a [`SynchronizedQueue`], so callers
/// can wait for every submitted job to *finish* with [`WorkerPool::wait_idle`].
///
/// # Examples
///
/// ```
/// use foundation_testing::scenarios::WorkerPool;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let pool = WorkerPool::new(4);
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..10 {
///     let counter_clone = Arc::clone(&counter);
///     pool.execute(move || {
///         counter_clone.fetch_add(1, Ordering::Relaxed);
///     });
/// }
///
/// pool.wait_idle();
/// assert_eq!(counter.load(Ordering::Relaxed), 10);
/// ```
pub struct WorkerPool {
    workers: Vec<Worker>,
    queue: Arc<SynchronizedQueue<Message>>,
}

impl WorkerPool {
    /// Creates a new pool with the given number of workers.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "WorkerPool size must be > 0");

        let queue = Arc::new(SynchronizedQueue::with_config(
            QueueConfig::new().label("worker_pool"),
        ));
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            workers.push(Worker::new(id, Arc::clone(&queue)));
        }

        Self { workers, queue }
    }

    /// Queues a job for the next free worker.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Message::Run(Box::new(f)));
    }

    /// Blocks until every job submitted so far has finished running.
    pub fn wait_idle(&self) {
        self.queue.join();
    }

    /// Number of jobs submitted but not yet finished.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.unfinished_tasks()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // One stop message per worker, queued behind any outstanding jobs.
        for _ in &self.workers {
            self.queue.push(Message::Stop);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    tracing::error!(worker = worker.id, "worker thread panicked");
                }
            }
        }
    }
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, queue: Arc<SynchronizedQueue<Message>>) -> Self {
        let thread = thread::spawn(move || loop {
            let (message, _guard) = queue.pop_with_guard();
            match message {
                Message::Run(job) => {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        tracing::error!(worker = id, "job panicked");
                    }
                }
                Message::Stop => {
                    tracing::debug!(worker = id, "worker stopping");
                    break;
                }
            }
        });

        Self {
            id,
            thread: Some(thread),
        }
    }
}
