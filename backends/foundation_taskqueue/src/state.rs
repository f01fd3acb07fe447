// Lock-protected state shared between a queue handle and the completion
// guards it hands out.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, WaitTimeoutResult};
use std::time::Duration;

use crate::logs::log_debug;

/// The single record every queue operation mutates under [`Shared::state`].
///
/// `unfinished` counts items pushed but not yet completed, whether they are
/// still queued or already popped. `armed_guards` counts live
/// [`crate::CompletionGuard`]s, which are the only way an item can still be
/// completed once the queue handle itself is gone.
pub(crate) struct QueueState<T> {
    pub(crate) items: VecDeque<T>,
    pub(crate) unfinished: usize,
    pub(crate) armed_guards: usize,
}

impl<T> QueueState<T> {
    /// Unfinished items that no live guard is responsible for.
    pub(crate) fn unguarded(&self) -> usize {
        self.unfinished.saturating_sub(self.armed_guards)
    }
}

/// Outcome of decrementing the unfinished count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// The count went down; `drained` is true when it reached zero.
    Done { drained: bool },
    /// The count was already zero.
    Underflow,
}

pub(crate) struct Shared<T> {
    /// The mutex used to protect the items and counters.
    state: Mutex<QueueState<T>>,

    /// Signalled once per push, wakes a single popper.
    pub(crate) not_empty: Condvar,

    /// Signalled when `unfinished` reaches zero, wakes every joiner.
    pub(crate) all_done: Condvar,

    pub(crate) label: &'static str,
}

impl<T> Shared<T> {
    pub(crate) fn new(initial_capacity: usize, label: &'static str) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(initial_capacity),
                unfinished: 0,
                armed_guards: 0,
            }),
            not_empty: Condvar::new(),
            all_done: Condvar::new(),
            label,
        }
    }

    /// Locks the state, recovering it if a previous holder panicked.
    ///
    /// Counters are only touched in sections that cannot panic, so a poisoned
    /// lock still guards consistent state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        match self.state.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Blocks on `not_empty` until at least one item is queued.
    pub(crate) fn wait_not_empty<'a>(
        &self,
        guard: MutexGuard<'a, QueueState<T>>,
    ) -> MutexGuard<'a, QueueState<T>> {
        match self.not_empty.wait_while(guard, |state| state.items.is_empty()) {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Blocks on `not_empty` until an item is queued or `timeout` elapses.
    pub(crate) fn wait_not_empty_timeout<'a>(
        &self,
        guard: MutexGuard<'a, QueueState<T>>,
        timeout: Duration,
    ) -> (MutexGuard<'a, QueueState<T>>, WaitTimeoutResult) {
        match self
            .not_empty
            .wait_timeout_while(guard, timeout, |state| state.items.is_empty())
        {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Blocks on `all_done` until the unfinished count is zero.
    pub(crate) fn wait_drained<'a>(
        &self,
        guard: MutexGuard<'a, QueueState<T>>,
    ) -> MutexGuard<'a, QueueState<T>> {
        match self.all_done.wait_while(guard, |state| state.unfinished > 0) {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Blocks on `all_done` until the unfinished count is zero or `timeout`
    /// elapses.
    pub(crate) fn wait_drained_timeout<'a>(
        &self,
        guard: MutexGuard<'a, QueueState<T>>,
        timeout: Duration,
    ) -> (MutexGuard<'a, QueueState<T>>, WaitTimeoutResult) {
        match self
            .all_done
            .wait_timeout_while(guard, timeout, |state| state.unfinished > 0)
        {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Decrements the unfinished count and wakes all joiners when it hits
    /// zero. `from_guard` also releases one armed guard slot.
    ///
    /// Never panics; callers decide how to report [`Completion::Underflow`].
    pub(crate) fn complete_one(&self, from_guard: bool) -> Completion {
        let mut state = self.lock();
        if state.unfinished == 0 {
            return Completion::Underflow;
        }

        state.unfinished -= 1;
        if from_guard {
            state.armed_guards = state.armed_guards.saturating_sub(1);
        }

        let drained = state.unfinished == 0;
        log_debug!(
            label = self.label,
            unfinished = state.unfinished,
            from_guard,
            "item completed"
        );
        drop(state);

        if drained {
            log_debug!(label = self.label, "queue drained");
            self.all_done.notify_all();
        }

        Completion::Done { drained }
    }
}
