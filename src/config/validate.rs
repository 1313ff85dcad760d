// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{default_workers, ExecutorConfig, PipelineConfig, RawPipelineConfig};
use crate::errors::{FlowdagError, Result};

impl TryFrom<RawPipelineConfig> for PipelineConfig {
    type Error = crate::errors::FlowdagError;

    fn try_from(raw: RawPipelineConfig) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;

        let task_timeout = raw
            .executor
            .task_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?;

        Ok(PipelineConfig {
            executor: ExecutorConfig {
                workers: raw.executor.workers.unwrap_or_else(default_workers),
                task_timeout,
            },
            on_failure: raw.pipeline.on_failure,
        })
    }
}

/// Check basic invariants of a raw config without converting it.
pub fn validate_config(cfg: &RawPipelineConfig) -> Result<()> {
    validate_executor(cfg)?;
    Ok(())
}

fn validate_executor(cfg: &RawPipelineConfig) -> Result<()> {
    if cfg.executor.workers == Some(0) {
        return Err(FlowdagError::ConfigError(
            "[executor].workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(ref raw) = cfg.executor.task_timeout {
        let timeout = parse_duration(raw)?;
        if timeout.is_zero() {
            return Err(FlowdagError::ConfigError(
                "[executor].task_timeout must be greater than zero".to_string(),
            ));
        }
    }

    Ok(())
}

/// Parse a duration string like `"250ms"`, `"30s"` or `"2m"`.
///
/// A bare number is read as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let s = raw.trim();
    let invalid = || {
        FlowdagError::ConfigError(format!(
            "invalid duration '{raw}' (expected e.g. \"250ms\", \"30s\" or \"2m\")"
        ))
    };

    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, "s"),
    };
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
