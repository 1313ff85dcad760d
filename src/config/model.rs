// src/config/model.rs

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use crate::types::FailurePolicy;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// workers = 4
/// task_timeout = "30s"
///
/// [pipeline]
/// on_failure = "skip_dependents"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPipelineConfig {
    /// Worker pool settings from `[executor]`.
    #[serde(default)]
    pub executor: RawExecutorSection,

    /// Coordinator behaviour from `[pipeline]`.
    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// `[executor]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawExecutorSection {
    /// Maximum number of work functions running at once.
    ///
    /// If `None`, the available parallelism of the host is used.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Per-task deadline such as `"250ms"`, `"30s"` or `"2m"`.
    #[serde(default)]
    pub task_timeout: Option<String>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// `"abort"` (default) or `"skip_dependents"`.
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

/// Validated executor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Always >= 1.
    pub workers: usize,
    pub task_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            task_timeout: None,
        }
    }
}

/// Validated pipeline configuration.
///
/// Build one with [`PipelineConfig::default`] and the `with_*` helpers, or
/// load it from TOML with [`crate::config::load_and_validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub executor: ExecutorConfig,
    pub on_failure: FailurePolicy,
}

impl PipelineConfig {
    /// Set the worker count (clamped to at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.executor.workers = workers.max(1);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.executor.task_timeout = Some(timeout);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}

pub(crate) fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
