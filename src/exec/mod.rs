// src/exec/mod.rs

//! Execution layer.
//!
//! Work functions are ordinary blocking closures. This module runs them on
//! Tokio's blocking pool behind a semaphore-bounded worker pool and hands
//! their outcomes back to the coordinator.
//!
//! - [`executor`] owns the pool and the registry of in-flight executions.
//! - [`task_runner`] runs one work function and classifies its outcome.

pub mod executor;
pub mod task_runner;

pub use executor::Executor;
