use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::logs::{log_debug, log_error, log_info, log_warn};
use crate::state::{Completion, QueueState, Shared};
use crate::{CompletionGuard, QueueConfig, QueueError, QueueResult};

/// `SynchronizedQueue` is an unbounded FIFO shared between any number of
/// producer and consumer threads, with join-style completion tracking.
///
/// Every pushed item counts as unfinished until it is completed, either by an
/// explicit [`SynchronizedQueue::mark_done`] or by dropping the
/// [`CompletionGuard`] returned from the `*_with_guard*` pop variants.
/// [`SynchronizedQueue::join`] blocks until that count drains to zero, which
/// means every item was both popped and finished, not merely popped.
///
/// Share the queue by reference (scoped threads) or inside an `Arc`.
///
/// # Teardown
///
/// Dropping the queue joins first: it blocks until every outstanding guard has
/// completed its item, possibly on another thread. Items that can no longer be
/// completed by anyone (still queued, or popped without a guard and never
/// marked done) would make that join hang forever, so dropping in that state
/// panics instead. Use [`SynchronizedQueue::try_dispose`] for a teardown that
/// never blocks.
///
/// A guard passed to [`std::mem::forget`] still counts as outstanding, so a
/// drop waiting on it blocks forever rather than panicking.
///
/// # Examples
///
/// ```
/// use foundation_taskqueue::SynchronizedQueue;
/// use std::thread;
///
/// let queue = SynchronizedQueue::new();
///
/// thread::scope(|s| {
///     s.spawn(|| {
///         for _ in 0..3 {
///             let (item, _guard) = queue.pop_with_guard();
///             assert!(item < 3);
///         }
///     });
///
///     for i in 0..3 {
///         queue.push(i);
///     }
///     queue.join();
/// });
///
/// assert_eq!(queue.unfinished_tasks(), 0);
/// ```
pub struct SynchronizedQueue<T> {
    shared: Arc<Shared<T>>,
}

// --- constructors

impl<T> Default for SynchronizedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SynchronizedQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    #[must_use]
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(
                config.get_initial_capacity(),
                config.get_label(),
            )),
        }
    }
}

// --- producers

impl<T> SynchronizedQueue<T> {
    /// Appends `item` to the tail and wakes one waiting popper.
    pub fn push(&self, item: T) {
        let mut state = self.shared.lock();
        self.enqueue(&mut state, item);
        drop(state);

        self.shared.not_empty.notify_one();
    }

    /// Pushes `item` then blocks until every unfinished item, including this
    /// one, has been completed.
    pub fn push_and_wait_until_drained(&self, item: T) {
        let mut state = self.shared.lock();
        self.enqueue(&mut state, item);
        self.shared.not_empty.notify_one();

        log_debug!(
            label = self.shared.label,
            unfinished = state.unfinished,
            "waiting for queue to drain after push"
        );
        let _state = self.shared.wait_drained(state);
    }

    fn enqueue(&self, state: &mut QueueState<T>, item: T) {
        state.items.push_back(item);
        state.unfinished += 1;
        log_debug!(
            label = self.shared.label,
            queued = state.items.len(),
            unfinished = state.unfinished,
            "pushed item"
        );
    }
}

// --- consumers

impl<T> SynchronizedQueue<T> {
    /// Blocks until an item is available and removes it from the head.
    ///
    /// The item stays unfinished: call [`SynchronizedQueue::mark_done`] once it
    /// has been processed, or use [`SynchronizedQueue::pop_with_guard`].
    pub fn pop(&self) -> T {
        let mut state = self.shared.lock();
        loop {
            if let Some(item) = self.dequeue(&mut state, false) {
                return item;
            }

            log_debug!(label = self.shared.label, "waiting for an item");
            state = self.shared.wait_not_empty(state);
        }
    }

    /// Like [`SynchronizedQueue::pop`] but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::TimedOut`] when no item became available in
    /// time. Nothing is removed and the unfinished count is untouched.
    pub fn pop_with_timeout(&self, timeout: Duration) -> QueueResult<T> {
        self.pop_within(timeout, false)
    }

    /// Pops the head item together with the guard that completes it.
    pub fn pop_with_guard(&self) -> (T, CompletionGuard<T>) {
        let mut state = self.shared.lock();
        loop {
            if let Some(item) = self.dequeue(&mut state, true) {
                return (item, self.guard());
            }

            log_debug!(label = self.shared.label, "waiting for an item");
            state = self.shared.wait_not_empty(state);
        }
    }

    /// Like [`SynchronizedQueue::pop_with_guard`] but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::TimedOut`] when no item became available in time.
    pub fn pop_with_guard_and_timeout(
        &self,
        timeout: Duration,
    ) -> QueueResult<(T, CompletionGuard<T>)> {
        let item = self.pop_within(timeout, true)?;
        Ok((item, self.guard()))
    }

    /// Removes the head item if one is queued, without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] when nothing is queued.
    pub fn try_pop(&self) -> QueueResult<T> {
        let mut state = self.shared.lock();
        self.dequeue(&mut state, false).ok_or(QueueError::Empty)
    }

    /// Non-blocking variant of [`SynchronizedQueue::pop_with_guard`].
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] when nothing is queued.
    pub fn try_pop_with_guard(&self) -> QueueResult<(T, CompletionGuard<T>)> {
        let mut state = self.shared.lock();
        let item = self.dequeue(&mut state, true).ok_or(QueueError::Empty)?;
        drop(state);
        Ok((item, self.guard()))
    }

    fn pop_within(&self, timeout: Duration, guarded: bool) -> QueueResult<T> {
        let state = self.shared.lock();
        let (mut state, _) = self.shared.wait_not_empty_timeout(state, timeout);

        match self.dequeue(&mut state, guarded) {
            Some(item) => Ok(item),
            None => {
                log_debug!(
                    label = self.shared.label,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "pop timed out"
                );
                Err(QueueError::TimedOut(timeout))
            }
        }
    }

    /// Takes the head item. A guarded pop reserves its guard slot in the same
    /// critical section so teardown always sees a consistent guard count.
    fn dequeue(&self, state: &mut QueueState<T>, guarded: bool) -> Option<T> {
        let item = state.items.pop_front()?;
        if guarded {
            state.armed_guards += 1;
        }
        log_debug!(
            label = self.shared.label,
            queued = state.items.len(),
            unfinished = state.unfinished,
            guarded,
            "popped item"
        );
        Some(item)
    }

    fn guard(&self) -> CompletionGuard<T> {
        CompletionGuard::new(Arc::clone(&self.shared))
    }
}

// --- completion tracking

impl<T> SynchronizedQueue<T> {
    /// Marks one popped item as finished, waking every joiner when the
    /// unfinished count reaches zero.
    ///
    /// # Panics
    ///
    /// Panics if called more times than items were pushed.
    pub fn mark_done(&self) {
        if self.shared.complete_one(false) == Completion::Underflow {
            panic!("mark_done() called more times than items were pushed");
        }
    }

    /// Blocks until every pushed item has been completed.
    pub fn join(&self) {
        let state = self.shared.lock();
        if state.unfinished > 0 {
            log_debug!(
                label = self.shared.label,
                unfinished = state.unfinished,
                "joining queue"
            );
        }
        let _state = self.shared.wait_drained(state);
    }

    /// Like [`SynchronizedQueue::join`] but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::TimedOut`] when items are still unfinished once
    /// `timeout` has elapsed.
    pub fn join_timeout(&self, timeout: Duration) -> QueueResult<()> {
        let state = self.shared.lock();
        let (state, _) = self.shared.wait_drained_timeout(state, timeout);

        if state.unfinished == 0 {
            return Ok(());
        }

        log_debug!(
            label = self.shared.label,
            unfinished = state.unfinished,
            "join timed out"
        );
        Err(QueueError::TimedOut(timeout))
    }
}

// --- inspection

impl<T> SynchronizedQueue<T> {
    /// Number of items currently queued (pushed but not yet popped).
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.lock().items.is_empty()
    }

    /// Number of items pushed but not yet completed, queued or in flight.
    #[must_use]
    pub fn unfinished_tasks(&self) -> usize {
        self.shared.lock().unfinished
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.shared.label
    }
}

// --- teardown

impl<T> SynchronizedQueue<T> {
    /// Disposes of the queue only if it has fully drained, never blocking.
    ///
    /// # Errors
    ///
    /// Hands the queue back unchanged while items are still unfinished, so
    /// the caller can join, retry later or keep using it.
    pub fn try_dispose(self) -> Result<(), Self> {
        if self.unfinished_tasks() > 0 {
            return Err(self);
        }
        drop(self);
        Ok(())
    }
}

impl<T> Drop for SynchronizedQueue<T> {
    fn drop(&mut self) {
        let state = self.shared.lock();

        // Only guards can still complete items once the handle is going away.
        let stranded = state.unguarded();
        if stranded > 0 {
            drop(state);
            if thread::panicking() {
                log_error!(
                    label = self.shared.label,
                    stranded,
                    "queue dropped during unwind with unfinished items"
                );
                return;
            }
            panic!("queue dropped with {stranded} unfinished item(s) that no guard can complete");
        }

        if state.unfinished > 0 {
            log_warn!(
                label = self.shared.label,
                outstanding = state.armed_guards,
                "queue dropped while guards are outstanding, waiting for them"
            );
        }

        let state = self.shared.wait_drained(state);
        assert!(state.unfinished == 0, "Expected all tasks to be finished");
        drop(state);

        log_info!(label = self.shared.label, "queue disposed");
    }
}

impl<T> fmt::Debug for SynchronizedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("SynchronizedQueue")
            .field("label", &self.shared.label)
            .field("queued", &state.items.len())
            .field("unfinished", &state.unfinished)
            .finish()
    }
}
