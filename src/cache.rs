//! Disk cache for fetched Overpass data.
//!
//! One JSON file per postal-code set. Caching the raw fetch rather than the
//! finished plan means the engine can be re-run with a different match radius
//! without going back to Overpass.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::overpass::RawBundle;

pub struct RawCache {
    dir: PathBuf,
}

impl RawCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Stable cache key: sorted postal codes joined with underscores
    pub fn key(codes: &[String]) -> String {
        let mut sorted: Vec<&str> = codes.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.join("_")
    }

    fn path_for(&self, codes: &[String]) -> PathBuf {
        self.dir.join(format!("raw_{}.json", Self::key(codes)))
    }

    /// Load the cached bundle for these codes, if present
    pub fn load(&self, codes: &[String]) -> Result<Option<RawBundle>> {
        let path = self.path_for(codes);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file {}", path.display()))?;
        let bundle = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache file {}", path.display()))?;
        info!("Loaded cached raw data from {}", path.display());
        Ok(Some(bundle))
    }

    /// Write the bundle for these codes, creating the cache directory
    pub fn store(&self, codes: &[String], bundle: &RawBundle) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache dir {}", self.dir.display()))?;
        let path = self.path_for(codes);
        let content = serde_json::to_string(bundle).context("Failed to serialize raw data")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;
        info!("Cached raw data at {}", path.display());
        Ok(())
    }
}
