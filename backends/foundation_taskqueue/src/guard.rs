use std::fmt;
use std::sync::Arc;
use std::thread;

use crate::logs::log_error;
use crate::state::{Completion, Shared};

/// `CompletionGuard` carries the obligation to mark one popped item as done.
///
/// It is handed out by the `*_with_guard*` pop variants of
/// [`crate::SynchronizedQueue`] and completes its item exactly once: either
/// through [`CompletionGuard::complete`] or when it is dropped, whichever comes
/// first. Moving the guard moves the obligation with it, including onto another
/// thread, and the guard stays valid after the queue handle that produced it
/// has been dropped.
///
/// # Panics
///
/// Dropping an armed guard panics if the queue's unfinished count is already
/// zero, which only happens when the same item was also completed through
/// [`crate::SynchronizedQueue::mark_done`]. While the thread is already
/// unwinding this is logged instead so the process is not aborted.
#[must_use = "dropping the guard immediately marks the item as done"]
pub struct CompletionGuard<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> CompletionGuard<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared: Some(shared),
        }
    }

    /// Marks the guarded item as done now instead of at end of scope.
    pub fn complete(mut self) {
        self.release();
    }

    /// Returns true while the guard still owes a completion.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.shared.is_some()
    }

    fn release(&mut self) {
        let Some(shared) = self.shared.take() else {
            return;
        };

        if shared.complete_one(true) == Completion::Underflow {
            if thread::panicking() {
                log_error!(
                    label = shared.label,
                    "completion guard released during unwind with no unfinished items"
                );
                return;
            }
            panic!("mark_done() called more times than items were pushed");
        }
    }
}

impl<T> Drop for CompletionGuard<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for CompletionGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionGuard")
            .field("label", &self.shared.as_ref().map(|shared| shared.label))
            .field("armed", &self.is_armed())
            .finish()
    }
}

#[cfg(test)]
mod test_completion_guard {
    use std::panic;

    use tracing_test::traced_test;

    use super::*;
    use crate::{QueueConfig, SynchronizedQueue};

    fn shared_with_unfinished(count: usize) -> Arc<Shared<u8>> {
        let shared = Arc::new(Shared::new(0, "guard-test"));
        {
            let mut state = shared.lock();
            state.unfinished = count;
            state.armed_guards = count;
        }
        shared
    }

    #[test]
    fn drop_completes_exactly_once() {
        let shared = shared_with_unfinished(2);

        let guard = CompletionGuard::new(Arc::clone(&shared));
        assert!(guard.is_armed());
        drop(guard);

        assert_eq!(shared.lock().unfinished, 1);
        assert_eq!(shared.lock().armed_guards, 1);
    }

    #[test]
    fn complete_consumes_the_obligation() {
        let shared = shared_with_unfinished(1);

        CompletionGuard::new(Arc::clone(&shared)).complete();

        assert_eq!(shared.lock().unfinished, 0);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn moving_a_guard_does_not_duplicate_completion() {
        let shared = shared_with_unfinished(2);

        let guard = CompletionGuard::new(Arc::clone(&shared));
        let moved = guard;
        let mut holder = vec![moved];
        holder.clear();

        assert_eq!(shared.lock().unfinished, 1);
    }

    #[test]
    #[should_panic(expected = "mark_done() called more times than items were pushed")]
    fn over_completion_panics() {
        let shared = shared_with_unfinished(0);
        drop(CompletionGuard::new(shared));
    }

    #[test]
    #[traced_test]
    fn over_completion_during_unwind_logs_instead_of_aborting() {
        let result = panic::catch_unwind(|| {
            let queue = SynchronizedQueue::with_config(QueueConfig::new().label("unwinding"));
            queue.push(3_u8);

            let (_item, _guard) = queue.pop_with_guard();
            queue.mark_done();
            panic!("worker failed while holding the guard");
        });

        assert!(result.is_err());
        assert!(logs_contain(
            "completion guard released during unwind with no unfinished items"
        ));
    }

    #[test]
    fn debug_shows_armed_state() {
        let shared = shared_with_unfinished(1);
        let guard = CompletionGuard::new(shared);
        let rendered = format!("{guard:?}");

        assert!(rendered.contains("CompletionGuard"));
        assert!(rendered.contains("guard-test"));
        assert!(rendered.contains("armed: true"));
    }
}
