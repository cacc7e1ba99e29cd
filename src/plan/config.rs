use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use paperroute::engine::EngineConfig;
use paperroute::overpass::DEFAULT_ENDPOINT;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub plan: PlanConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub postal_codes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlanConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("data/streets_status.json")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            postal_codes: Vec::new(),
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
