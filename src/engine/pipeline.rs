// src/engine/pipeline.rs

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::dag::{
    Graph, ReadOnlyStateManager, StateManager, Task, TaskId, TaskOutcome, TaskState,
};
use crate::engine::report::RunReport;
use crate::errors::{FlowdagError, Result};
use crate::exec::Executor;
use crate::types::FailurePolicy;

/// Owns a graph of tasks and drives them to completion.
///
/// The pipeline is the single coordinator: it alone decides readiness and
/// forwards producer results. Workers only ever see their own inputs.
///
/// ```no_run
/// # async fn demo() -> flowdag::errors::Result<()> {
/// use flowdag::engine::Pipeline;
///
/// let mut pipeline: Pipeline<String> = Pipeline::new();
/// let a = pipeline.create_task(|_| Ok("Hello".to_string()));
/// let b = pipeline.create_task(|inputs: Vec<String>| Ok(format!("{}, World!", inputs[0])));
/// pipeline.set_dependency(a, b)?;
/// pipeline.run().await?;
/// assert_eq!(pipeline.result(b)?, "Hello, World!");
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<T> {
    graph: Graph<TaskId>,
    tasks: Vec<Task<T>>,
    config: PipelineConfig,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::with_config(PipelineConfig::default())
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("tasks", &self.tasks)
            .field("edges", &self.graph.edge_count())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            graph: Graph::new(),
            tasks: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph<TaskId> {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wrap `work` in a task named `task-<n>` and register it as a node.
    pub fn create_task<F>(&mut self, work: F) -> TaskId
    where
        F: FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static,
    {
        let name = format!("task-{}", self.tasks.len());
        self.create_named_task(name, work)
    }

    /// Wrap `work` in a task with a human-readable name (used in logs).
    pub fn create_named_task<F>(&mut self, name: impl Into<String>, work: F) -> TaskId
    where
        F: FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static,
    {
        let id = TaskId(self.tasks.len());
        let task = Task::new(id, name, Box::new(work));
        debug!(task = %task.name(), id = %id, "created task");
        self.tasks.push(task);
        self.graph.add_node(id);
        id
    }

    /// Declare that `dependent` consumes the output of `producer`.
    ///
    /// The order of these calls for one dependent is the order of its
    /// inputs. Declaring the same edge twice is a no-op.
    pub fn set_dependency(&mut self, producer: TaskId, dependent: TaskId) -> Result<()> {
        self.task(producer)?;
        self.task(dependent)?;
        self.graph.add_edge(producer, dependent);
        debug!(producer = %producer, dependent = %dependent, "added dependency");
        Ok(())
    }

    /// Fail with [`FlowdagError::Cycle`] if the dependencies form a cycle.
    pub fn validate(&self) -> Result<()> {
        match self.graph.find_back_edge() {
            None => Ok(()),
            Some((from, to)) => {
                let from_name = self.tasks.get(from.index()).map_or("?", |t| t.name());
                let to_name = self.tasks.get(to.index()).map_or("?", |t| t.name());
                Err(FlowdagError::Cycle(format!(
                    "cycle detected in task DAG at edge '{from_name}' ({from}) -> '{to_name}' ({to})"
                )))
            }
        }
    }

    pub fn task(&self, id: TaskId) -> Result<&Task<T>> {
        self.tasks
            .get(id.index())
            .ok_or(FlowdagError::UnknownTask(id))
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task<T>> {
        self.tasks.iter()
    }

    pub fn state(&self, id: TaskId) -> Result<TaskState> {
        Ok(self.task(id)?.state())
    }

    pub fn outcome(&self, id: TaskId) -> Result<Option<&TaskOutcome<T>>> {
        Ok(self.task(id)?.outcome())
    }

    /// The value produced by `id`, or why there is none.
    pub fn result(&self, id: TaskId) -> Result<&T> {
        self.task(id)?.result()
    }

    /// Producers of `id`, in declaration order.
    pub fn dependencies(&self, id: TaskId) -> &[TaskId] {
        self.graph.predecessors(id)
    }

    /// Direct consumers of `id`.
    pub fn dependents(&self, id: TaskId) -> &[TaskId] {
        self.graph.successors(id)
    }

    /// Tasks without producers.
    pub fn initial_tasks(&self) -> Vec<TaskId> {
        self.graph.roots()
    }

    /// Pending tasks whose every producer finished successfully.
    pub fn ready_tasks(&self) -> Vec<TaskId> {
        ReadOnlyStateManager::new(&self.graph, &self.tasks).ready_tasks()
    }
}

impl<T: Clone> Pipeline<T> {
    /// Producer results for `id`, in declaration order.
    pub fn task_inputs(&self, id: TaskId) -> Result<Vec<T>> {
        self.task(id)?;
        self.graph
            .predecessors(id)
            .iter()
            .map(|producer| self.result(*producer).cloned())
            .collect()
    }
}

impl<T: Clone + Send + 'static> Pipeline<T> {
    /// Validate, then execute every task, blocking until the run is over.
    pub async fn run(&mut self) -> Result<RunReport> {
        self.run_with_cancel(CancellationToken::new()).await
    }

    /// Like [`Pipeline::run`], but stops submitting work once `cancel` fires.
    ///
    /// Cancellation is cooperative: executions already in flight are allowed
    /// to finish (their outcomes are recorded), then the run returns
    /// [`FlowdagError::Cancelled`]. Ready tasks still waiting for a worker
    /// stay `Pending`.
    pub async fn run_with_cancel(&mut self, cancel: CancellationToken) -> Result<RunReport> {
        self.validate()?;

        let started = Instant::now();
        let mut report = RunReport::default();

        if self.tasks.is_empty() {
            info!("empty pipeline; nothing to run");
            return Ok(report);
        }

        let mut executor: Executor<T> = Executor::from_config(&self.config.executor);
        info!(
            tasks = self.tasks.len(),
            workers = executor.pool_size(),
            on_failure = ?self.config.on_failure,
            "pipeline run started"
        );

        // First reason to stop submitting; in-flight work is still drained.
        let mut halt: Option<FlowdagError> = None;
        // Ready but not yet submitted, dispatched in ascending id order.
        let mut ready: BTreeSet<TaskId> = self.ready_tasks().into_iter().collect();

        loop {
            if halt.is_none() && !self.submit_ready(&mut executor, &mut ready, &cancel)? {
                warn!("cancellation requested; no further tasks will be submitted");
                halt = Some(FlowdagError::Cancelled);
            }

            if !executor.has_pending() {
                break;
            }

            let completed = tokio::select! {
                biased;
                _ = cancel.cancelled(), if halt.is_none() => {
                    warn!(
                        in_flight = executor.in_flight(),
                        "cancellation requested; draining in-flight tasks"
                    );
                    halt = Some(FlowdagError::Cancelled);
                    continue;
                }
                completed = executor.await_any(&mut self.tasks) => completed?,
            };

            for id in completed {
                self.handle_completion(id, &mut report, &mut halt, &mut ready);
            }
        }

        report.elapsed = started.elapsed();

        if let Some(err) = halt {
            error!(error = %err, %report, "pipeline run stopped");
            return Err(err);
        }

        let view = ReadOnlyStateManager::new(&self.graph, &self.tasks);
        if !view.all_tasks_terminal() {
            let pending = view.pending_tasks();
            error!(?pending, "no task in flight and none ready, but tasks remain pending");
            return Err(FlowdagError::Stalled { pending });
        }

        info!(%report, "pipeline run finished");
        Ok(report)
    }

    /// Submit ready tasks while the executor has a free worker.
    ///
    /// Returns `false` if cancellation was observed before a submission.
    fn submit_ready(
        &mut self,
        executor: &mut Executor<T>,
        ready: &mut BTreeSet<TaskId>,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        while executor.has_capacity() && !ready.is_empty() {
            if cancel.is_cancelled() {
                return Ok(false);
            }
            let Some(id) = ready.pop_first() else {
                break;
            };

            let task = self
                .tasks
                .get(id.index())
                .ok_or(FlowdagError::UnknownTask(id))?;
            if !task.is_pending() {
                debug!(id = %id, state = ?task.state(), "dropping stale ready entry");
                continue;
            }

            let inputs = self.task_inputs(id)?;
            let task = self
                .tasks
                .get_mut(id.index())
                .ok_or(FlowdagError::UnknownTask(id))?;
            executor.submit(task, inputs)?;
        }

        if !ready.is_empty() {
            debug!(waiting = ready.len(), "ready tasks waiting for a free worker");
        }
        Ok(true)
    }

    /// Record one completion and apply the failure policy.
    fn handle_completion(
        &mut self,
        id: TaskId,
        report: &mut RunReport,
        halt: &mut Option<FlowdagError>,
        ready: &mut BTreeSet<TaskId>,
    ) {
        let failure = match self.tasks.get(id.index()).and_then(|t| t.outcome()) {
            Some(TaskOutcome::Success(_)) => {
                report.succeeded.push(id);
                let unlocked = ReadOnlyStateManager::new(&self.graph, &self.tasks).newly_ready(id);
                if !unlocked.is_empty() {
                    debug!(producer = %id, ?unlocked, "dependents became ready");
                }
                ready.extend(unlocked);
                return;
            }
            Some(TaskOutcome::Failed(failure)) => failure.clone(),
            None => {
                warn!(id = %id, "completion without a stored outcome; ignoring");
                return;
            }
        };

        report.failed.push(id);

        match self.config.on_failure {
            FailurePolicy::Abort => {
                if halt.is_none() {
                    warn!(id = %id, error = %failure, "task failed; aborting run");
                    *halt = Some(FlowdagError::WorkFailed { task: id, failure });
                }
            }
            FailurePolicy::SkipDependents => {
                let mut manager = StateManager::new(&self.graph, &mut self.tasks);
                let skipped = manager.mark_dependents_skipped(id);
                warn!(
                    id = %id,
                    error = %failure,
                    skipped = skipped.len(),
                    "task failed; skipping its dependents"
                );
                report.skipped.extend(skipped);
            }
        }
    }
}
