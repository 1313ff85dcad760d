// src/dag/state_manager.rs

//! Readiness and terminal-state bookkeeping for the coordinator.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::dag::graph::Graph;
use crate::dag::task::{Task, TaskId};

/// Mutating view over the task arena, used when a completion changes what
/// can run next.
pub struct StateManager<'a, T> {
    graph: &'a Graph<TaskId>,
    tasks: &'a mut [Task<T>],
}

impl<'a, T> StateManager<'a, T> {
    pub fn new(graph: &'a Graph<TaskId>, tasks: &'a mut [Task<T>]) -> Self {
        Self { graph, tasks }
    }

    /// Mark every still-pending transitive dependent of a failed task as
    /// `Skipped`.
    ///
    /// Returns the newly skipped tasks (excluding the failed task itself).
    pub fn mark_dependents_skipped(&mut self, failed: TaskId) -> Vec<TaskId> {
        let mut stack: Vec<TaskId> = self.graph.successors(failed).to_vec();
        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut newly_skipped = Vec::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }

            let Some(task) = self.tasks.get_mut(id.index()) else {
                warn!(id = %id, "node in DAG not present in task arena");
                continue;
            };

            if !task.is_pending() {
                // Already terminal, or (impossibly) running without its producer.
                continue;
            }

            match task.mark_skipped() {
                Ok(()) => {
                    debug!(
                        task = %task.name(),
                        upstream = %failed,
                        "skipping dependent due to upstream failure"
                    );
                    newly_skipped.push(id);
                    stack.extend(self.graph.successors(id).iter().copied());
                }
                Err(err) => warn!(id = %id, error = %err, "could not skip dependent"),
            }
        }

        newly_skipped
    }

    pub fn read_only(&self) -> ReadOnlyStateManager<'_, T> {
        ReadOnlyStateManager::new(self.graph, &*self.tasks)
    }
}

/// A read-only view for readiness queries.
pub struct ReadOnlyStateManager<'a, T> {
    graph: &'a Graph<TaskId>,
    tasks: &'a [Task<T>],
}

impl<'a, T> ReadOnlyStateManager<'a, T> {
    pub fn new(graph: &'a Graph<TaskId>, tasks: &'a [Task<T>]) -> Self {
        Self { graph, tasks }
    }

    /// Whether every producer of `id` finished successfully.
    ///
    /// A task without producers is trivially satisfied.
    pub fn deps_satisfied(&self, id: TaskId) -> bool {
        self.graph.predecessors(id).iter().all(|dep| {
            self.tasks
                .get(dep.index())
                .is_some_and(|task| task.is_succeeded())
        })
    }

    /// Pending tasks whose producers all succeeded, in ascending id order.
    pub fn ready_tasks(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.is_pending() && self.deps_satisfied(task.id()))
            .map(|task| task.id())
            .collect()
    }

    /// Dependents of `producer` that just became ready.
    ///
    /// Only the producer's direct successors are inspected, so a completion
    /// costs O(out-degree x in-degree) instead of a scan of every task.
    pub fn newly_ready(&self, producer: TaskId) -> Vec<TaskId> {
        self.graph
            .successors(producer)
            .iter()
            .copied()
            .filter(|&id| {
                self.tasks.get(id.index()).is_some_and(Task::is_pending) && self.deps_satisfied(id)
            })
            .collect()
    }

    pub fn pending_tasks(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.is_pending())
            .map(|task| task.id())
            .collect()
    }

    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks.iter().all(|task| task.is_terminal())
    }
}
