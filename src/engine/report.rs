// src/engine/report.rs

use std::fmt;
use std::time::Duration;

use crate::dag::TaskId;

/// Summary of one `Pipeline::run`.
///
/// Task ids appear in the order their completion (or skip) was observed by
/// the coordinator.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub succeeded: Vec<TaskId>,
    pub failed: Vec<TaskId>,
    pub skipped: Vec<TaskId>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Every task touched by this run finished successfully.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Number of tasks that reached a terminal state during this run.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped in {:?}",
            self.succeeded.len(),
            self.failed.len(),
            self.skipped.len(),
            self.elapsed
        )
    }
}
