// tests/config_loading.rs

use std::fs;
use std::time::Duration;

use flowdag::config::{load_and_validate, load_from_path, parse_duration, FailurePolicy, PipelineConfig};
use flowdag::errors::FlowdagError;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("flowdag.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn full_config_is_loaded_and_validated() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[executor]
workers = 4
task_timeout = "250ms"

[pipeline]
on_failure = "skip_dependents"
"#,
    );

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.executor.workers, 4);
    assert_eq!(cfg.executor.task_timeout, Some(Duration::from_millis(250)));
    assert_eq!(cfg.on_failure, FailurePolicy::SkipDependents);
}

#[test]
fn empty_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg, PipelineConfig::default());
    assert!(cfg.executor.workers >= 1);
    assert_eq!(cfg.executor.task_timeout, None);
    assert_eq!(cfg.on_failure, FailurePolicy::Abort);
}

#[test]
fn raw_config_keeps_unset_fields_empty() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[pipeline]\non_failure = \"abort\"\n");

    let raw = load_from_path(&path).unwrap();

    assert_eq!(raw.executor.workers, None);
    assert_eq!(raw.executor.task_timeout, None);
    assert_eq!(raw.pipeline.on_failure, FailurePolicy::Abort);
}

#[test]
fn zero_workers_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[executor]\nworkers = 0\n");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, FlowdagError::ConfigError(msg) if msg.contains("workers")));
}

#[test]
fn zero_timeout_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[executor]\ntask_timeout = \"0s\"\n");

    assert!(matches!(load_and_validate(&path), Err(FlowdagError::ConfigError(_))));
}

#[test]
fn unknown_policy_is_a_toml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[pipeline]\non_failure = \"retry\"\n");

    assert!(matches!(load_and_validate(&path), Err(FlowdagError::TomlError(_))));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[executor]\nthreads = 3\n");

    assert!(matches!(load_from_path(&path), Err(FlowdagError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(load_and_validate(&path), Err(FlowdagError::IoError(_))));
}

#[test]
fn durations_accept_common_units() {
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
    assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    assert_eq!(parse_duration(" 5 ").unwrap(), Duration::from_secs(5));

    for bad in ["", "ms", "1h", "-3s", "1.5s"] {
        assert!(parse_duration(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn failure_policy_parses_from_str() {
    assert_eq!("abort".parse::<FailurePolicy>().unwrap(), FailurePolicy::Abort);
    assert_eq!("skip-dependents".parse::<FailurePolicy>().unwrap(), FailurePolicy::SkipDependents);
    assert_eq!("Skip".parse::<FailurePolicy>().unwrap(), FailurePolicy::SkipDependents);
    assert!("retry".parse::<FailurePolicy>().is_err());
}

#[test]
fn builder_helpers_override_defaults() {
    let cfg = PipelineConfig::default()
        .with_workers(0)
        .with_task_timeout(Duration::from_secs(1))
        .with_failure_policy(FailurePolicy::SkipDependents);

    assert_eq!(cfg.executor.workers, 1);
    assert_eq!(cfg.executor.task_timeout, Some(Duration::from_secs(1)));
    assert_eq!(cfg.on_failure, FailurePolicy::SkipDependents);
}
