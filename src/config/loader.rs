// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{PipelineConfig, RawPipelineConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawPipelineConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawPipelineConfig = toml::from_str(&contents)?;
    debug!(path = %path.display(), "loaded pipeline config");

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks the worker count and parses the task deadline.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let raw_config = load_from_path(&path)?;
    let config = PipelineConfig::try_from(raw_config)?;
    Ok(config)
}
