//! Cache configuration

use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Configuration for sizing and placing the segment cache.
///
/// The cache has no file format of its own; hosts embed this struct in their
/// own settings and deserialize it with serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Smallest budget the planner will hand out (default: 500MiB)
    pub min_cache_size_bytes: u64,

    /// Largest budget the planner will hand out (default: 10GiB)
    pub max_cache_size_bytes: u64,

    /// Share of currently available storage the cache may claim (default: 0.20)
    pub available_fraction: f64,

    /// Subdirectory created under the host's storage root
    pub cache_directory: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            min_cache_size_bytes: 500 * MIB,
            max_cache_size_bytes: 10 * GIB,
            available_fraction: 0.20,
            cache_directory: "audio_cache".to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the budget floor.
    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_cache_size_bytes = bytes;
        self
    }

    /// Set the budget ceiling.
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_cache_size_bytes = bytes;
        self
    }

    /// Set the share of available storage the cache may use.
    pub fn with_available_fraction(mut self, fraction: f64) -> Self {
        self.available_fraction = fraction;
        self
    }

    /// Set cache directory name.
    pub fn with_cache_directory(mut self, dir: impl Into<String>) -> Self {
        self.cache_directory = dir.into();
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_cache_size_bytes == 0 {
            return Err("min_cache_size_bytes must be greater than 0".to_string());
        }

        if self.min_cache_size_bytes > self.max_cache_size_bytes {
            return Err(format!(
                "min_cache_size_bytes ({}) exceeds max_cache_size_bytes ({})",
                self.min_cache_size_bytes, self.max_cache_size_bytes
            ));
        }

        if !(self.available_fraction > 0.0 && self.available_fraction <= 1.0) {
            return Err(format!(
                "available_fraction must be in (0, 1], got {}",
                self.available_fraction
            ));
        }

        if self.cache_directory.is_empty() {
            return Err("cache_directory cannot be empty".to_string());
        }

        if self.cache_directory.contains(['/', '\\']) || self.cache_directory == ".." {
            return Err(format!(
                "cache_directory must be a single path component, got {:?}",
                self.cache_directory
            ));
        }

        Ok(())
    }
}
