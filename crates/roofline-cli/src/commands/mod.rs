pub mod config;
pub mod nodes;
pub mod render;
pub mod roof;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cluster_roofline::RooflineConfig;

/// Load the configuration file, or the built-in default when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<RooflineConfig> {
    match path {
        Some(path) => RooflineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(RooflineConfig::default()),
    }
}
