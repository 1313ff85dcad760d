// src/lib.rs

//! Concurrent execution of user work functions arranged in a dependency DAG.
//!
//! Build a [`Pipeline`](engine::Pipeline), register work functions with
//! `create_task`, wire producers to consumers with `set_dependency`, then
//! `run` it: independent tasks execute concurrently on a bounded worker
//! pool and each task receives its producers' results as inputs, in
//! declaration order.

pub mod cli;
pub mod config;
pub mod dag;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, PipelineConfig};
use crate::dag::TaskId;
use crate::demo::{sample_grid, stats_pipeline, Payload};
use crate::engine::{CancellationToken, Pipeline};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - the demo pipeline
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = match args.config {
        Some(ref path) => load_and_validate(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(workers) = args.workers {
        cfg = cfg.with_workers(workers);
    }

    let grid = sample_grid(args.seed);
    let (mut pipeline, merge) = stats_pipeline(cfg, grid.clone())?;
    pipeline.validate()?;

    if args.dry_run {
        print_dry_run(&pipeline);
        return Ok(());
    }

    // Ctrl-C -> stop submitting and drain.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    info!(seed = args.seed, "running array-statistics pipeline");
    let report = pipeline.run_with_cancel(cancel).await?;
    info!(%report, "demo pipeline complete");

    println!("input grid:");
    print!("{}", Payload::Grid(grid));
    println!();
    println!("stats:");
    println!("{}", pipeline.result(merge)?);

    Ok(())
}

/// Simple dry-run output: print config, tasks and their producers.
fn print_dry_run(pipeline: &Pipeline<Payload>) {
    let cfg = pipeline.config();
    println!("flowdag dry-run");
    println!("  executor.workers = {}", cfg.executor.workers);
    if let Some(timeout) = cfg.executor.task_timeout {
        println!("  executor.task_timeout = {timeout:?}");
    }
    println!("  pipeline.on_failure = {:?}", cfg.on_failure);
    println!();

    println!("tasks ({}):", pipeline.len());
    for task in pipeline.tasks() {
        println!("  - {} {}", task.id(), task.name());
        let deps = pipeline.dependencies(task.id());
        if !deps.is_empty() {
            println!("      after: {}", describe(pipeline, deps));
        }
    }
    println!();

    println!("edges:");
    print!("{}", pipeline.graph());
    println!();
    println!("initial: {}", describe(pipeline, &pipeline.initial_tasks()));

    debug!("dry-run complete (no execution)");
}

fn describe(pipeline: &Pipeline<Payload>, ids: &[TaskId]) -> String {
    ids.iter()
        .map(|id| pipeline.task(*id).map_or_else(|_| id.to_string(), |t| t.name().to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}
