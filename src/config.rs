// src/config.rs

//! Configuration loading utilities.
//!
//! Reads the declarative TOML document from disk. Resolution into a
//! [`RunConfig`](crate::models::RunConfig) happens separately and does no I/O.

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::ConfigFile;

/// Load the configuration document from a TOML file.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    log::info!("Loading configuration from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("failed to read config file {}: {e}", path.display()))
    })?;

    parse_config(&content)
        .map_err(|e| AppError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Parse the configuration document from a TOML string.
pub fn parse_config(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}
