// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the `flowdag` demo runner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdag",
    version,
    about = "Run the array-statistics demo pipeline on a concurrent DAG executor.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a pipeline config file (TOML).
    ///
    /// If omitted, built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `[executor].workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Seed for the generated input grid.
    #[arg(long, value_name = "N", default_value_t = 7)]
    pub seed: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Build and validate the pipeline, print the DAG, but don't run it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
