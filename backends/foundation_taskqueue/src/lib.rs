//! Thread-safe work queue with join-style completion tracking.
//!
//! This crate provides:
//! - [`SynchronizedQueue`]: an unbounded FIFO for any number of producers and
//!   consumers, plus a barrier ([`SynchronizedQueue::join`]) that waits until
//!   every pushed item has been *completed*, not just popped
//! - [`CompletionGuard`]: the drop guard that completes one popped item
//! - [`QueueError`]: the recoverable outcomes of timed and non-blocking calls
//! - [`QueueConfig`]: construction-time sizing and log labelling
//!
//! # Examples
//!
//! ```rust
//! use foundation_taskqueue::{QueueConfig, SynchronizedQueue};
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let queue = Arc::new(SynchronizedQueue::with_config(
//!     QueueConfig::new().label("jobs"),
//! ));
//!
//! for job in 0..10 {
//!     queue.push(job);
//! }
//!
//! let workers: Vec<_> = (0..2)
//!     .map(|_| {
//!         let queue = Arc::clone(&queue);
//!         thread::spawn(move || {
//!             while let Ok((job, _guard)) =
//!                 queue.pop_with_guard_and_timeout(Duration::from_millis(50))
//!             {
//!                 assert!(job < 10);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! queue.join();
//! assert!(queue.is_empty());
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! ```
//!
//! # Features
//!
//! - `standard` (default): emits info, warning and error events through `tracing`
//! - `debug_trace`: additionally emits debug events for every push, pop and wait

#![warn(clippy::pedantic)]

mod logs;

mod config;
mod errors;
mod guard;
mod queue;
mod state;

pub use config::*;
pub use errors::*;
pub use guard::*;
pub use queue::*;
