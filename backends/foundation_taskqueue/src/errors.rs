use core::time::Duration;

use derive_more::From;

pub type QueueResult<T> = core::result::Result<T, QueueError>;

/// Recoverable outcomes of the non-blocking and timed queue operations.
///
/// Misuse of the queue (completing more items than were pushed, dropping a
/// queue whose items can never be completed) is not represented here; those
/// are invariant violations and panic instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub enum QueueError {
    /// The wait expired before its condition held. Carries the requested
    /// timeout.
    TimedOut(Duration),

    /// Nothing was queued when a non-blocking pop was attempted.
    #[from(ignore)]
    Empty,
}

impl QueueError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueueError::TimedOut(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, QueueError::Empty)
    }
}

impl core::error::Error for QueueError {}

impl core::fmt::Display for QueueError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            QueueError::TimedOut(waited) => write!(f, "QueueError::TimedOut({waited:?})"),
            QueueError::Empty => write!(f, "QueueError::Empty"),
        }
    }
}

#[cfg(test)]
mod test_queue_errors {
    use super::*;

    #[test]
    fn timeout_is_distinguishable_from_empty() {
        let timed_out = QueueError::TimedOut(Duration::from_millis(50));

        assert!(timed_out.is_timeout());
        assert!(!timed_out.is_empty());
        assert!(QueueError::Empty.is_empty());
        assert!(!QueueError::Empty.is_timeout());
    }

    #[test]
    fn duration_converts_into_timeout() {
        let err: QueueError = Duration::from_millis(10).into();
        assert_eq!(err, QueueError::TimedOut(Duration::from_millis(10)));
    }

    #[test]
    fn display_names_the_variant() {
        assert_eq!(
            QueueError::TimedOut(Duration::from_millis(5)).to_string(),
            "QueueError::TimedOut(5ms)"
        );
        assert_eq!(QueueError::Empty.to_string(), "QueueError::Empty");
    }
}
