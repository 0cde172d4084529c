//! Configuration file loading

use anyhow::{Context, Result};
use biathlon_core::RaceConfig;
use std::fs;
use std::path::Path;

/// Load race configuration from a JSON file
pub fn load_config(path: &Path) -> Result<RaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: RaceConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // Surface bad values before any event is read
    config
        .validate()
        .with_context(|| format!("Invalid value in config file: {:?}", path))?;

    Ok(config)
}
