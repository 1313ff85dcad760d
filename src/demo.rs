// src/demo.rs

//! The array-statistics demo pipeline run by the `flowdag` binary.
//!
//! ```text
//! generate ──> raw_stats ───────────────────> merge
//!     └──────> normalize ──> normalized_stats ──┘
//! ```

use std::fmt;

use anyhow::{bail, Context};

use crate::config::PipelineConfig;
use crate::dag::TaskId;
use crate::engine::Pipeline;
use crate::errors::Result;

pub type Grid = Vec<Vec<f64>>;

/// Summary statistics of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Values flowing between the demo tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Grid(Grid),
    Stats(Stats),
    Merged { raw: Stats, normalized: Stats },
}

impl Payload {
    fn into_grid(self) -> anyhow::Result<Grid> {
        match self {
            Payload::Grid(grid) => Ok(grid),
            other => bail!("expected a grid input, got {other:?}"),
        }
    }

    fn into_stats(self) -> anyhow::Result<Stats> {
        match self {
            Payload::Stats(stats) => Ok(stats),
            other => bail!("expected a stats input, got {other:?}"),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Grid(grid) => {
                for row in grid {
                    let cells: Vec<String> = row.iter().map(|v| format!("{v:>4}")).collect();
                    writeln!(f, "{}", cells.join(" "))?;
                }
                Ok(())
            }
            Payload::Stats(s) => write!(
                f,
                "min: {} max: {} mean: {:.4} std: {:.4}",
                s.min, s.max, s.mean, s.std
            ),
            Payload::Merged { raw, normalized } => {
                writeln!(f, "raw min: {}", raw.min)?;
                writeln!(f, "raw max: {}", raw.max)?;
                writeln!(f, "raw mean: {:.4}", raw.mean)?;
                writeln!(f, "raw std: {:.4}", raw.std)?;
                writeln!(f, "normalized min: {}", normalized.min)?;
                writeln!(f, "normalized max: {}", normalized.max)?;
                writeln!(f, "normalized mean: {:.4}", normalized.mean)?;
                write!(f, "normalized std: {:.4}", normalized.std)
            }
        }
    }
}

/// Deterministic 3x4 grid of integers in `0..10` derived from `seed`.
pub fn sample_grid(seed: u64) -> Grid {
    (0..3u64)
        .map(|i| {
            (0..4u64)
                .map(|j| seed.wrapping_mul(31).wrapping_add(i * 17 + j * 7 + i * j) % 10)
                .map(|v| v as f64)
                .collect()
        })
        .collect()
}

pub fn compute_stats(grid: &Grid) -> anyhow::Result<Stats> {
    let values: Vec<f64> = grid.iter().flatten().copied().collect();
    if values.is_empty() {
        bail!("cannot compute statistics of an empty grid");
    }

    let n = values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Ok(Stats {
        min,
        max,
        mean,
        std: variance.sqrt(),
    })
}

/// Min-max scale every cell into `[0, 1]`.
pub fn normalize(grid: &Grid) -> anyhow::Result<Grid> {
    let stats = compute_stats(grid)?;
    let range = stats.max - stats.min;
    if range == 0.0 {
        bail!("cannot normalize a constant grid (every cell is {})", stats.min);
    }

    Ok(grid
        .iter()
        .map(|row| row.iter().map(|v| (v - stats.min) / range).collect())
        .collect())
}

/// Build the five-task statistics pipeline over `grid`.
///
/// Returns the pipeline and the handle of the final `merge` task.
pub fn stats_pipeline(config: PipelineConfig, grid: Grid) -> Result<(Pipeline<Payload>, TaskId)> {
    let mut pipeline: Pipeline<Payload> = Pipeline::with_config(config);

    let generate = pipeline.create_named_task("generate", move |_| Ok(Payload::Grid(grid)));

    let raw_stats = pipeline.create_named_task("raw_stats", |inputs: Vec<Payload>| {
        let grid = single_input(inputs)?.into_grid()?;
        Ok(Payload::Stats(compute_stats(&grid)?))
    });

    let normalize_task = pipeline.create_named_task("normalize", |inputs: Vec<Payload>| {
        let grid = single_input(inputs)?.into_grid()?;
        Ok(Payload::Grid(normalize(&grid)?))
    });

    let normalized_stats = pipeline.create_named_task("normalized_stats", |inputs: Vec<Payload>| {
        let grid = single_input(inputs)?.into_grid()?;
        Ok(Payload::Stats(compute_stats(&grid)?))
    });

    let merge = pipeline.create_named_task("merge", |inputs: Vec<Payload>| {
        let [raw, normalized]: [Payload; 2] = inputs
            .try_into()
            .map_err(|v: Vec<Payload>| anyhow::anyhow!("merge expects 2 inputs, got {}", v.len()))?;
        Ok(Payload::Merged {
            raw: raw.into_stats().context("first input of merge")?,
            normalized: normalized.into_stats().context("second input of merge")?,
        })
    });

    // `merge` takes raw stats first, normalized stats second.
    let edges = [
        (generate, raw_stats),
        (generate, normalize_task),
        (normalize_task, normalized_stats),
        (raw_stats, merge),
        (normalized_stats, merge),
    ];
    for (producer, dependent) in edges {
        pipeline.set_dependency(producer, dependent)?;
    }

    Ok((pipeline, merge))
}

fn single_input(inputs: Vec<Payload>) -> anyhow::Result<Payload> {
    let count = inputs.len();
    let mut inputs = inputs.into_iter();
    match (inputs.next(), inputs.next()) {
        (Some(only), None) => Ok(only),
        _ => bail!("expected exactly one input, got {count}"),
    }
}
