//! Dataset download worker.
//!
//! This crate provides:
//! - The task pool running download-then-extract jobs in parallel
//! - Aggregate progress reporting
//! - Worker configuration and structured job logging

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pool;
pub mod progress;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use pool::{JobOutcome, TaskPool};
pub use progress::{PoolProgress, PoolSummary};
