// src/types.rs

use std::str::FromStr;
use serde::Deserialize;

/// What the coordinator does when a work function fails.
///
/// - `Abort`: stop submitting new tasks, let in-flight executions finish,
///   and return the failure from the run (default behaviour).
/// - `SkipDependents`: mark every downstream task of the failed one as
///   skipped and keep running the independent branches. The run itself
///   succeeds and reports failed and skipped tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Abort,
    SkipDependents,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Abort
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip_dependents" | "skip" => Ok(FailurePolicy::SkipDependents),
            other => Err(format!(
                "invalid on_failure policy: {other} (expected \"abort\" or \"skip_dependents\")"
            )),
        }
    }
}
