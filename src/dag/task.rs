// src/dag/task.rs

//! Work units and their per-run state machine.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::errors::{FlowdagError, Result};

/// Opaque handle to a task inside one pipeline.
///
/// Handles are indices into the pipeline's task arena, handed out in
/// creation order. They are only meaningful for the pipeline that issued
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Build a handle for a standalone task arena (for example when driving
    /// an [`Executor`](crate::exec::Executor) directly). Pipelines issue their
    /// own handles.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A user work function: receives producer results in declaration order and
/// returns one value.
pub type WorkFn<T> = Box<dyn FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static>;

/// Lifecycle of a task within a run.
///
/// `Pending -> Started -> Finished` is the normal path. `Pending -> Skipped`
/// happens only when an upstream task failed and the pipeline is configured
/// to skip dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Started,
    Finished,
    Skipped,
}

/// Why a work function did not produce a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkFailure {
    #[error("work function returned an error: {0}")]
    Error(String),

    #[error("work function panicked: {0}")]
    Panicked(String),

    #[error("work function exceeded its deadline of {0:?}")]
    TimedOut(Duration),
}

/// Outcome of one execution, stored in the task when it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Success(T),
    Failed(WorkFailure),
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}

/// A work unit plus its state and write-once outcome slot.
pub struct Task<T> {
    id: TaskId,
    name: String,
    work: Option<WorkFn<T>>,
    state: TaskState,
    outcome: Option<TaskOutcome<T>>,
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T> Task<T> {
    pub fn new(id: TaskId, name: impl Into<String>, work: WorkFn<T>) -> Self {
        Self {
            id,
            name: name.into(),
            work: Some(work),
            state: TaskState::Pending,
            outcome: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == TaskState::Pending
    }

    pub fn is_started(&self) -> bool {
        self.state == TaskState::Started
    }

    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }

    /// Finished successfully, so dependents may consume the result.
    pub fn is_succeeded(&self) -> bool {
        self.outcome.as_ref().is_some_and(TaskOutcome::is_success)
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TaskState::Finished | TaskState::Skipped)
    }

    /// The stored outcome, present only once the task is `Finished`.
    pub fn outcome(&self) -> Option<&TaskOutcome<T>> {
        self.outcome.as_ref()
    }

    /// The produced value.
    ///
    /// Distinguishes "not finished yet" ([`FlowdagError::NotReady`]) from
    /// "finished with an error" ([`FlowdagError::WorkFailed`]).
    pub fn result(&self) -> Result<&T> {
        match (&self.state, &self.outcome) {
            (TaskState::Finished, Some(TaskOutcome::Success(value))) => Ok(value),
            (TaskState::Finished, Some(TaskOutcome::Failed(failure))) => {
                Err(FlowdagError::WorkFailed {
                    task: self.id,
                    failure: failure.clone(),
                })
            }
            (TaskState::Skipped, _) => Err(FlowdagError::Skipped(self.id)),
            _ => Err(FlowdagError::NotReady(self.id)),
        }
    }

    /// `Pending -> Started`; hands the work function to the caller.
    ///
    /// The work function is moved out, so a task can never be dispatched
    /// twice.
    pub(crate) fn mark_started(&mut self) -> Result<WorkFn<T>> {
        self.ensure_state(TaskState::Pending, TaskState::Started)?;
        let work = self.work.take().ok_or(FlowdagError::InvalidTransition {
            task: self.id,
            from: self.state,
            to: TaskState::Started,
        })?;
        self.state = TaskState::Started;
        debug!(task = %self.name, id = %self.id, "state Pending -> Started");
        Ok(work)
    }

    /// `Started -> Finished`; stores the outcome exactly once.
    pub(crate) fn mark_finished(&mut self, outcome: TaskOutcome<T>) -> Result<()> {
        self.ensure_state(TaskState::Started, TaskState::Finished)?;
        self.outcome = Some(outcome);
        self.state = TaskState::Finished;
        debug!(task = %self.name, id = %self.id, "state Started -> Finished");
        Ok(())
    }

    /// `Pending -> Skipped`; the work function is dropped unrun.
    pub(crate) fn mark_skipped(&mut self) -> Result<()> {
        self.ensure_state(TaskState::Pending, TaskState::Skipped)?;
        self.work = None;
        self.state = TaskState::Skipped;
        debug!(task = %self.name, id = %self.id, "state Pending -> Skipped");
        Ok(())
    }

    fn ensure_state(&self, expected: TaskState, to: TaskState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FlowdagError::InvalidTransition {
                task: self.id,
                from: self.state,
                to,
            })
        }
    }
}
