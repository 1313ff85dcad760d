// src/engine/mod.rs

//! Orchestration engine for flowdag.
//!
//! [`Pipeline`] owns the task graph and runs the coordinator loop:
//! submit every ready task, wait for at least one completion, apply the
//! failure policy, and repeat until nothing is in flight and nothing can
//! become ready. [`RunReport`] summarises what happened.

pub mod pipeline;
pub mod report;

pub use pipeline::Pipeline;
pub use report::RunReport;
pub use tokio_util::sync::CancellationToken;
