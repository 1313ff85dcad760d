use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered log of work-function events.
///
/// Wrap work functions with [`ExecutionLog::recorded`] to record
/// `"<name>:start"` and `"<name>:end"` around each call.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// How many times `name` started executing.
    pub fn starts(&self, name: &str) -> usize {
        let needle = format!("{name}:start");
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == needle)
            .count()
    }

    /// Position of `event` in the log, if it happened.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    /// Wrap `work` so its start and end are recorded under `name`.
    pub fn recorded<T, F>(
        &self,
        name: &str,
        work: F,
    ) -> impl FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static
    where
        T: 'static,
        F: FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static,
    {
        let log = self.clone();
        let name = name.to_string();
        move |inputs: Vec<T>| {
            log.record(format!("{name}:start"));
            let out = work(inputs);
            log.record(format!("{name}:end"));
            out
        }
    }
}

/// Tracks how many probed work functions run at the same time.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest number of overlapping executions observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Work function that holds a slot for `delay` and returns `value`.
    pub fn sleeping<T: Send + 'static>(
        &self,
        delay: Duration,
        value: T,
    ) -> impl FnOnce(Vec<T>) -> anyhow::Result<T> + Send + 'static {
        let probe = self.clone();
        move |_inputs: Vec<T>| {
            let now = probe.current.fetch_add(1, Ordering::SeqCst) + 1;
            probe.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(delay);
            probe.current.fetch_sub(1, Ordering::SeqCst);
            Ok(value)
        }
    }
}
