//! Construction-time settings for [`crate::SynchronizedQueue`].

/// Configuration for a [`crate::SynchronizedQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Number of slots reserved up front in the item buffer
    initial_capacity: usize,
    /// Name attached to every log event the queue emits
    label: &'static str,
}

impl QueueConfig {
    /// Label used when none is configured.
    pub const DEFAULT_LABEL: &'static str = "queue";

    /// Creates a new queue configuration with default values.
    ///
    /// Defaults:
    /// - `initial_capacity`: 0 (grow on demand)
    /// - `label`: `"queue"`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_capacity: 0,
            label: Self::DEFAULT_LABEL,
        }
    }

    /// Reserves room for `capacity` items before the first push.
    ///
    /// This is a sizing hint only; the queue stays unbounded.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the label reported in log events.
    #[must_use]
    pub const fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Returns the initial capacity.
    #[must_use]
    pub const fn get_initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns the label.
    #[must_use]
    pub const fn get_label(&self) -> &'static str {
        self.label
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unsized_and_generically_labelled() {
        let config = QueueConfig::default();
        assert_eq!(config.get_initial_capacity(), 0);
        assert_eq!(config.get_label(), QueueConfig::DEFAULT_LABEL);
    }

    #[test]
    fn builder_overrides_values() {
        let config = QueueConfig::new().initial_capacity(128).label("ingest");
        assert_eq!(config.get_initial_capacity(), 128);
        assert_eq!(config.get_label(), "ingest");
    }
}
