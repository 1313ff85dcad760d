// src/logging.rs

//! Logging setup for the `flowdag` binary using `tracing` +
//! `tracing-subscriber`.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the host's job. Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `FLOWDAG_LOG` environment variable, either a bare level ("debug") or
//!    full directives ("flowdag::exec=debug,info")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout carries only pipeline results.
//! Thread ids are included because task start/finish lines come from the
//! blocking worker threads.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(directive_for(lvl)),
        None => EnvFilter::try_from_env("FLOWDAG_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn directive_for(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
