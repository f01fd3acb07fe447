//! Common patterns built on [`foundation_taskqueue::SynchronizedQueue`].
//!
//! - Worker pool with completion-aware idle waiting

pub mod worker_pool;

pub use worker_pool::WorkerPool;
