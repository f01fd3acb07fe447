//! Stress testing infrastructure for `foundation_taskqueue`.
//!
//! This crate provides:
//! - **Stress harness**: many producers and consumers against one queue, with
//!   exactly-once delivery checks and latency figures
//! - **Common scenarios**: a worker pool driven by guarded pops
//! - **Criterion benchmarks**: push/pop, hand-off and full stress runs
//!
//! # Examples
//!
//! ```rust
//! use foundation_testing::stress::{run_queue_stress, StressConfig};
//!
//! let config = StressConfig::new()
//!     .producers(2)
//!     .consumers(4)
//!     .items_per_producer(500);
//!
//! let report = run_queue_stress(config).unwrap();
//! assert_eq!(report.delivered, 1000);
//! assert!(report.throughput() > 0.0);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Common for testing crates

pub mod scenarios;
pub mod stress;

// Re-export commonly used items
pub use scenarios::WorkerPool;
pub use stress::{run_queue_stress, StressConfig, StressError, StressReport};
