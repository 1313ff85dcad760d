// src/config/mod.rs

//! Configuration loading and validation for flowdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate worker count and deadlines (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ExecutorConfig, PipelineConfig, PipelineSection, RawExecutorSection, RawPipelineConfig};
pub use validate::{parse_duration, validate_config};
pub use crate::types::FailurePolicy;
