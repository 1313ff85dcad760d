// src/exec/executor.rs

//! Bounded worker pool plus the registry of in-flight executions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::config::ExecutorConfig;
use crate::dag::{Task, TaskId, TaskOutcome, WorkFailure};
use crate::errors::{FlowdagError, Result};
use crate::exec::task_runner::{join_error_message, run_task};

/// Runs work functions concurrently, at most `pool_size` at a time.
///
/// The executor never touches scheduling state beyond the tasks handed to
/// it: `submit` moves a task to `Started`, `await_any` moves completed ones
/// to `Finished`. Callers should submit only while [`Executor::has_capacity`]
/// holds, so a `Started` task always has a worker. The semaphore still
/// bounds running work functions, including ones abandoned after their
/// deadline. Must be used from within a Tokio runtime.
pub struct Executor<T> {
    pool: Arc<Semaphore>,
    pool_size: usize,
    task_timeout: Option<Duration>,
    in_flight: JoinSet<TaskOutcome<T>>,
    /// In-flight execution -> owning task. At most one entry per task.
    registry: HashMap<Id, TaskId>,
}

impl<T> fmt::Debug for Executor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("pool_size", &self.pool_size)
            .field("task_timeout", &self.task_timeout)
            .field("in_flight", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Executor<T> {
    /// `pool_size` is clamped to at least 1.
    pub fn new(pool_size: usize, task_timeout: Option<Duration>) -> Self {
        let pool_size = pool_size.max(1);
        Self {
            pool: Arc::new(Semaphore::new(pool_size)),
            pool_size,
            task_timeout,
            in_flight: JoinSet::new(),
            registry: HashMap::new(),
        }
    }

    pub fn from_config(cfg: &ExecutorConfig) -> Self {
        Self::new(cfg.workers, cfg.task_timeout)
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Whether any submitted execution has not been collected yet.
    pub fn has_pending(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }

    /// Whether one more submission fits in the pool.
    pub fn has_capacity(&self) -> bool {
        self.registry.len() < self.pool_size
    }

    /// Dispatch `task` with the given inputs.
    ///
    /// The task must be `Pending`; it is marked `Started` before this returns
    /// and appears in the registry exactly once.
    pub fn submit(&mut self, task: &mut Task<T>, inputs: Vec<T>) -> Result<()> {
        let work = task.mark_started()?;
        let id = task.id();
        let name = task.name().to_string();

        let pool = Arc::clone(&self.pool);
        let deadline = self.task_timeout;
        let handle = self
            .in_flight
            .spawn(run_task(id, name, work, inputs, pool, deadline));

        debug!(
            task = %task.name(),
            id = %id,
            in_flight = self.registry.len() + 1,
            "submitted task for execution"
        );
        self.registry.insert(handle.id(), id);
        Ok(())
    }

    /// Block until at least one execution completes.
    ///
    /// Every other execution that has already completed is collected too.
    /// For each completion the outcome is stored into its task (now
    /// `Finished`) and the registry entry is removed. Returns the completed
    /// tasks, or an empty list if nothing was in flight.
    ///
    /// A completion that cannot be recorded (for example because `tasks` is
    /// not the arena the task was submitted from) is logged and left out.
    /// The error is returned only if nothing else could be recorded.
    ///
    /// Cancel safe: if the future is dropped before it resolves, no
    /// completion is lost.
    pub async fn await_any(&mut self, tasks: &mut [Task<T>]) -> Result<Vec<TaskId>> {
        let Some(first) = self.in_flight.join_next_with_id().await else {
            return Ok(Vec::new());
        };

        let mut completed = Vec::new();
        let mut first_error = None;
        let mut next = Some(first);
        while let Some(joined) = next {
            match self.record(joined, tasks) {
                Ok(id) => completed.push(id),
                Err(err) => {
                    error!(error = %err, "could not record completed execution");
                    first_error.get_or_insert(err);
                }
            }
            next = self.in_flight.try_join_next_with_id();
        }

        debug!(
            completed = completed.len(),
            still_in_flight = self.registry.len(),
            "collected completed executions"
        );

        match first_error {
            Some(err) if completed.is_empty() => Err(err),
            _ => Ok(completed),
        }
    }

    fn record(
        &mut self,
        joined: std::result::Result<(Id, TaskOutcome<T>), JoinError>,
        tasks: &mut [Task<T>],
    ) -> Result<TaskId> {
        let (join_id, outcome) = match joined {
            Ok(done) => done,
            Err(err) => {
                let join_id = err.id();
                warn!(error = %err, "execution wrapper ended abnormally");
                (
                    join_id,
                    TaskOutcome::Failed(WorkFailure::Panicked(join_error_message(err))),
                )
            }
        };

        let task_id = self.registry.remove(&join_id).ok_or_else(|| {
            FlowdagError::Other(anyhow!("completion for unregistered execution {join_id}"))
        })?;
        let task = tasks
            .get_mut(task_id.index())
            .ok_or(FlowdagError::UnknownTask(task_id))?;
        task.mark_finished(outcome)?;

        Ok(task_id)
    }
}
