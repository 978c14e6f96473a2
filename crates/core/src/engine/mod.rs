//! Pipeline engine: per-variant job store, FIFO queue, and single-flight
//! worker.
//!
//! - **Submission**: synchronous acceptance, preview allocation, enqueue
//! - **Processing**: one job at a time per instance, stages in order
//! - **Failure**: terminal per job, never blocks the queue

mod config;
mod runner;

pub use config::EngineConfig;
pub use runner::PipelineEngine;
