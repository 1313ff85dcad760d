// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::dag::{TaskId, TaskState, WorkFailure};

#[derive(Error, Debug)]
pub enum FlowdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cycle detected in DAG: {0}")]
    Cycle(String),

    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Task {0} has not finished yet")]
    NotReady(TaskId),

    #[error("Task {0} was skipped because an upstream task failed")]
    Skipped(TaskId),

    #[error("Task {task} failed: {failure}")]
    WorkFailed { task: TaskId, failure: WorkFailure },

    #[error("Task {task} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        task: TaskId,
        from: TaskState,
        to: TaskState,
    },

    #[error("Pipeline stalled with {} pending task(s) and nothing in flight", pending.len())]
    Stalled { pending: Vec<TaskId> },

    #[error("Pipeline run was cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FlowdagError>;
