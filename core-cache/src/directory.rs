//! Cache directory resolution

use crate::error::{CacheError, Result};
use bridge_traits::storage::FileSystemAccess;
use core_runtime::logging::dir_label;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Locates and creates the on-disk root backing the cache.
pub struct CacheDirectoryResolver;

impl CacheDirectoryResolver {
    /// Picks the storage root for the cache.
    ///
    /// The host's persistent data directory is preferred; hosts that cannot
    /// currently provide one (e.g. unmounted external storage) fall back to
    /// their cache directory.
    pub fn preferred_root(fs: &dyn FileSystemAccess) -> Result<PathBuf> {
        match fs.get_data_directory() {
            Some(dir) => Ok(dir),
            None => {
                debug!("No data directory available, falling back to cache directory");
                fs.get_cache_directory()
                    .map_err(|e| CacheError::StorageUnavailable {
                        path: PathBuf::new(),
                        reason: format!("no storage root available: {}", e),
                    })
            }
        }
    }

    /// Ensures `preferred_root/subdir` exists and returns it.
    ///
    /// Idempotent; missing ancestors are created as well.
    pub fn resolve(fs: &dyn FileSystemAccess, preferred_root: &Path, subdir: &str) -> Result<PathBuf> {
        let dir = preferred_root.join(subdir);

        if let Ok(true) = fs.exists(&dir) {
            return Ok(dir);
        }

        fs.create_dir_all(&dir).map_err(|e| {
            error!(dir = %dir_label(&dir), "Failed to create cache directory: {}", e);
            CacheError::StorageUnavailable {
                path: dir.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(dir = %dir_label(&dir), "Created cache directory");
        Ok(dir)
    }

    /// Total size in bytes of every file below `dir`.
    pub fn directory_size(fs: &dyn FileSystemAccess, dir: &Path) -> Result<u64> {
        if !fs.exists(dir)? {
            return Ok(0);
        }
        Ok(fs.directory_size(dir)?)
    }
}
