// src/exec/task_runner.rs

//! Individual work-function runner.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::dag::{TaskId, TaskOutcome, WorkFailure, WorkFn};

/// Run a single work function on the blocking pool and turn whatever
/// happens into a [`TaskOutcome`].
///
/// - Waits for a worker slot from `pool` first; the slot is held by the
///   blocking closure, so it is released only when the work function
///   returns.
/// - If `deadline` elapses, the outcome is `TimedOut`. The work function is
///   not interrupted: it keeps its slot until it returns and its value is
///   discarded.
/// - Errors and panics become `Failed` outcomes; nothing propagates to the
///   coordinator as a panic.
pub async fn run_task<T: Send + 'static>(
    id: TaskId,
    name: String,
    work: WorkFn<T>,
    inputs: Vec<T>,
    pool: Arc<Semaphore>,
    deadline: Option<Duration>,
) -> TaskOutcome<T> {
    let permit = match pool.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            error!(task = %name, id = %id, "worker pool closed before task could start");
            return TaskOutcome::Failed(WorkFailure::Error("worker pool closed".to_string()));
        }
    };

    info!(task = %name, id = %id, inputs = inputs.len(), "task STARTED");
    let started = Instant::now();

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work(inputs)
    });

    let joined = match deadline {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    task = %name,
                    id = %id,
                    deadline_ms = limit.as_millis() as u64,
                    "task exceeded its deadline; abandoning its result"
                );
                return TaskOutcome::Failed(WorkFailure::TimedOut(limit));
            }
        },
        None => handle.await,
    };

    let outcome = match joined {
        Ok(Ok(value)) => TaskOutcome::Success(value),
        Ok(Err(err)) => TaskOutcome::Failed(WorkFailure::Error(format!("{err:#}"))),
        Err(join_err) => TaskOutcome::Failed(WorkFailure::Panicked(join_error_message(join_err))),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        TaskOutcome::Success(_) => {
            info!(task = %name, id = %id, elapsed_ms, "task FINISHED");
        }
        TaskOutcome::Failed(failure) => {
            warn!(task = %name, id = %id, elapsed_ms, error = %failure, "task FAILED");
        }
    }

    outcome
}

/// Human-readable message for a join error (panic payload or cancellation).
pub(crate) fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        panic_payload_message(err.into_panic())
    } else {
        "execution was cancelled".to_string()
    }
}

fn panic_payload_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
