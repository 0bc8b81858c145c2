//! Stack configuration loading
//!
//! The format is chosen by file extension: `.json` is parsed as JSON,
//! everything else as TOML.

use anyhow::{Context, Result};
use authgraph::RawConfig;
use std::fs;
use std::path::Path;

use crate::paths;

/// Config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Parse content in this format
    pub fn parse(self, content: &str) -> Result<RawConfig> {
        match self {
            Self::Json => serde_json::from_str(content).context("Invalid JSON config"),
            Self::Toml => toml::from_str(content).context("Invalid TOML config"),
        }
    }
}

/// Load the raw stack configuration from `path` (`~` and `$VARS` expanded)
pub fn load(path: &str) -> Result<RawConfig> {
    let path = paths::expand(path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;

    let config = ConfigFormat::from_path(&path)
        .parse(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}
