//! Stress test framework for [`SynchronizedQueue`].
//!
//! A run spawns producers and consumers behind a shared start barrier,
//! tags every item with a unique id and checks afterwards that each id was
//! delivered exactly once and that the queue drained completely.

use core::time::Duration;
use foundation_taskqueue::{QueueConfig, SynchronizedQueue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;
use thiserror::Error;

pub mod config;

pub use config::StressConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StressError {
    #[error("item {id} was delivered {times} times")]
    DuplicateDelivery { id: usize, times: usize },

    #[error("expected {expected} deliveries but only {delivered} arrived")]
    MissingItems { expected: usize, delivered: usize },

    #[error("a {0} thread panicked during the stress run")]
    ThreadPanicked(&'static str),
}

/// An item flowing through the queue during a stress run.
struct StressItem {
    id: usize,
    pushed_at: Instant,
}

/// Result of a successful stress run.
#[derive(Debug, Clone)]
pub struct StressReport {
    /// Items delivered, one per pushed item
    pub delivered: usize,
    /// Items popped by each consumer, in spawn order
    pub per_consumer: Vec<usize>,
    /// Wall time from the start barrier to the last consumer stopping
    pub duration: Duration,
    /// Push-to-pop latency of every item, in nanoseconds
    pub latencies: Vec<u64>,
}

impl StressReport {
    /// Returns delivered items per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.delivered as f64 / secs
        }
    }

    /// Returns the push-to-pop latency at `percentile` (0.0 to 1.0).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn latency_percentile(&self, percentile: f64) -> Option<Duration> {
        if self.latencies.is_empty() || !(0.0..=1.0).contains(&percentile) {
            return None;
        }

        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();

        let rank = ((sorted.len() as f64) * percentile).ceil() as usize;
        let index = rank.saturating_sub(1).min(sorted.len() - 1);
        Some(Duration::from_nanos(sorted[index]))
    }

    /// Returns the slowest push-to-pop latency observed.
    #[must_use]
    pub fn max_latency(&self) -> Option<Duration> {
        self.latencies.iter().max().copied().map(Duration::from_nanos)
    }
}

/// Runs producers and consumers against one queue and verifies
/// exactly-once delivery.
///
/// Consumers pop with a guard and the configured timeout in a loop and stop
/// at their first timeout, so the run ends once producers are done and the
/// queue has stayed empty for one `pop_timeout`.
///
/// # Examples
///
/// ```
/// use foundation_testing::stress::{run_queue_stress, StressConfig};
///
/// let config = StressConfig::new().consumers(2).items_per_producer(200);
/// let report = run_queue_stress(config).unwrap();
///
/// assert_eq!(report.delivered, 200);
/// assert_eq!(report.per_consumer.len(), 2);
/// ```
///
/// # Errors
///
/// Returns a [`StressError`] describing the first violation found: an item
/// delivered more than once, items never delivered, or a panicked thread.
pub fn run_queue_stress(config: StressConfig) -> Result<StressReport, StressError> {
    let total = config.total_items();
    let queue = Arc::new(SynchronizedQueue::<StressItem>::with_config(
        QueueConfig::new()
            .label("stress")
            .initial_capacity(total),
    ));
    let deliveries: Arc<Vec<AtomicUsize>> =
        Arc::new((0..total).map(|_| AtomicUsize::new(0)).collect());
    let green_light = Arc::new(Barrier::new(
        config.get_producers() + config.get_consumers() + 1,
    ));

    let mut consumers = Vec::with_capacity(config.get_consumers());
    for _ in 0..config.get_consumers() {
        let queue = Arc::clone(&queue);
        let deliveries = Arc::clone(&deliveries);
        let green_light = Arc::clone(&green_light);

        consumers.push(thread::spawn(move || {
            green_light.wait();

            let mut latencies = Vec::new();
            while let Ok((item, _guard)) =
                queue.pop_with_guard_and_timeout(config.get_pop_timeout())
            {
                let waited = item.pushed_at.elapsed().as_nanos();
                latencies.push(u64::try_from(waited).unwrap_or(u64::MAX));
                deliveries[item.id].fetch_add(1, Ordering::SeqCst);

                if let Some(delay) = config.get_work_delay() {
                    thread::sleep(delay);
                }
            }
            latencies
        }));
    }

    let mut producers = Vec::with_capacity(config.get_producers());
    for producer in 0..config.get_producers() {
        let queue = Arc::clone(&queue);
        let green_light = Arc::clone(&green_light);
        let per_producer = config.get_items_per_producer();

        producers.push(thread::spawn(move || {
            green_light.wait();
            for offset in 0..per_producer {
                queue.push(StressItem {
                    id: producer * per_producer + offset,
                    pushed_at: Instant::now(),
                });
            }
        }));
    }

    green_light.wait();
    let started = Instant::now();

    let mut failure = None;
    let mut per_consumer = Vec::with_capacity(consumers.len());
    let mut latencies = Vec::with_capacity(total);
    for handle in consumers {
        match handle.join() {
            Ok(consumed) => {
                per_consumer.push(consumed.len());
                latencies.extend(consumed);
            }
            Err(_) => failure = Some(StressError::ThreadPanicked("consumer")),
        }
    }
    let duration = started.elapsed();

    for handle in producers {
        if handle.join().is_err() {
            failure = Some(StressError::ThreadPanicked("producer"));
        }
    }

    // Whatever is left would be stranded once the last handle drops.
    let mut leftover = 0;
    while queue.try_pop().is_ok() {
        queue.mark_done();
        leftover += 1;
    }
    if leftover > 0 {
        tracing::warn!(leftover, "stress run ended with items still queued");
    }

    if let Some(err) = failure {
        return Err(err);
    }

    let mut delivered = 0;
    for (id, count) in deliveries.iter().enumerate() {
        let times = count.load(Ordering::SeqCst);
        if times > 1 {
            return Err(StressError::DuplicateDelivery { id, times });
        }
        delivered += times;
    }

    if delivered != total {
        return Err(StressError::MissingItems {
            expected: total,
            delivered,
        });
    }

    tracing::info!(
        delivered,
        consumers = per_consumer.len(),
        elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        "stress run finished"
    );

    Ok(StressReport {
        delivered,
        per_consumer,
        duration,
        latencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(latencies: Vec<u64>) -> StressReport {
        StressReport {
            delivered: latencies.len(),
            per_consumer: vec![latencies.len()],
            duration: Duration::from_secs(2),
            latencies,
        }
    }

    #[test]
    fn throughput_divides_by_duration() {
        let report = report_with(vec![1; 10]);
        assert!((report.throughput() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn latency_percentile_picks_nearest_rank() {
        let report = report_with((1..=100).collect());

        assert_eq!(
            report.latency_percentile(0.5),
            Some(Duration::from_nanos(50))
        );
        assert_eq!(
            report.latency_percentile(0.25),
            Some(Duration::from_nanos(25))
        );
        assert_eq!(report.latency_percentile(0.0), Some(Duration::from_nanos(1)));
        assert_eq!(report.latency_percentile(1.5), None);
        assert_eq!(report.max_latency(), Some(Duration::from_nanos(100)));
    }

    #[test]
    fn empty_report_has_no_latency() {
        let report = report_with(Vec::new());
        assert_eq!(report.latency_percentile(0.5), None);
        assert_eq!(report.max_latency(), None);
    }

    #[test]
    fn small_run_delivers_everything() {
        let config = StressConfig::new()
            .producers(2)
            .consumers(3)
            .items_per_producer(250);

        let report = run_queue_stress(config).expect("stress run should pass");
        assert_eq!(report.delivered, 500);
        assert_eq!(report.per_consumer.iter().sum::<usize>(), 500);
        assert_eq!(report.latencies.len(), 500);
    }
}
