//! Stress test configuration.

use core::time::Duration;

/// Configuration for a queue stress run.
#[derive(Debug, Clone, Copy)]
pub struct StressConfig {
    /// Number of producer threads
    producers: usize,
    /// Number of consumer threads
    consumers: usize,
    /// Items pushed by each producer
    items_per_producer: usize,
    /// How long an idle consumer waits before it stops
    pop_timeout: Duration,
    /// Simulated processing time per item
    work_delay: Option<Duration>,
}

impl StressConfig {
    /// Creates a new stress configuration with default values.
    ///
    /// Defaults:
    /// - `producers`: 1
    /// - `consumers`: 4
    /// - `items_per_producer`: 4000
    /// - `pop_timeout`: 100ms
    /// - `work_delay`: None (no simulated work)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            producers: 1,
            consumers: 4,
            items_per_producer: 4000,
            pop_timeout: Duration::from_millis(100),
            work_delay: None,
        }
    }

    /// Sets the number of producer threads.
    #[must_use]
    pub const fn producers(mut self, count: usize) -> Self {
        self.producers = count;
        self
    }

    /// Sets the number of consumer threads.
    #[must_use]
    pub const fn consumers(mut self, count: usize) -> Self {
        self.consumers = count;
        self
    }

    /// Sets how many items each producer pushes.
    #[must_use]
    pub const fn items_per_producer(mut self, count: usize) -> Self {
        self.items_per_producer = count;
        self
    }

    /// Sets the idle timeout after which a consumer stops.
    ///
    /// Keep this well above the time producers need to get going, or
    /// consumers may give up before the first item arrives.
    #[must_use]
    pub const fn pop_timeout(mut self, timeout: Duration) -> Self {
        self.pop_timeout = timeout;
        self
    }

    /// Sets a per-item sleep to simulate work while holding the guard.
    #[must_use]
    pub const fn work_delay(mut self, delay: Duration) -> Self {
        self.work_delay = Some(delay);
        self
    }

    #[must_use]
    pub const fn get_producers(&self) -> usize {
        self.producers
    }

    #[must_use]
    pub const fn get_consumers(&self) -> usize {
        self.consumers
    }

    #[must_use]
    pub const fn get_items_per_producer(&self) -> usize {
        self.items_per_producer
    }

    /// Returns the total number of items the run will push.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.producers * self.items_per_producer
    }

    #[must_use]
    pub const fn get_pop_timeout(&self) -> Duration {
        self.pop_timeout
    }

    #[must_use]
    pub const fn get_work_delay(&self) -> Option<Duration> {
        self.work_delay
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::new()
    }
}
