// src/dag/mod.rs

//! DAG representation and per-task state.
//!
//! - [`graph`] holds a generic directed graph with cycle detection.
//! - [`task`] defines work units, their handles, and their state machine.
//! - [`state_manager`] answers readiness questions and applies failure
//!   fan-out over the task arena.

pub mod graph;
pub mod state_manager;
pub mod task;

pub use graph::Graph;
pub use state_manager::{ReadOnlyStateManager, StateManager};
pub use task::{Task, TaskId, TaskOutcome, TaskState, WorkFailure, WorkFn};
