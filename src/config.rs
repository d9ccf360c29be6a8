use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::DEFAULT_CIRCLE_SEGMENTS;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub geometry: GeometryConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/segmenta.sled"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Maximum records returned per region response
    pub record_limit: usize,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            record_limit: 500,
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeometryConfig {
    pub circle_segments: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
