pub mod recorder;

use std::sync::Once;
use std::time::Duration;

use flowdag::config::{FailurePolicy, PipelineConfig};
use tracing_subscriber::{fmt, EnvFilter};

pub use recorder::{ConcurrencyProbe, ExecutionLog};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=flowdag=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Config with a fixed worker count, so timing tests do not depend on the
/// host's core count.
pub fn config_with_workers(workers: usize) -> PipelineConfig {
    PipelineConfig::default().with_workers(workers)
}

/// Fixed worker count plus the skip-dependents failure policy.
pub fn skip_dependents_config(workers: usize) -> PipelineConfig {
    config_with_workers(workers).with_failure_policy(FailurePolicy::SkipDependents)
}

/// Work function that sleeps for `delay` and then returns `value`.
pub fn sleeping<T: Send + 'static>(
    delay: Duration,
    value: T,
) -> impl FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static {
    move |_inputs: Vec<T>| {
        std::thread::sleep(delay);
        Ok(value)
    }
}

/// Work function that always fails with `message`.
pub fn failing<T: 'static>(message: &str) -> impl FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static {
    let message = message.to_string();
    move |_inputs: Vec<T>| Err(anyhow::anyhow!(message))
}
