//! Storage and File System Abstractions
//!
//! Provides the platform-agnostic file system contract the cache core needs:
//! app directories, directory creation, and free-space queries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// Capacity snapshot of the volume that holds a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageStats {
    /// Bytes available to the current (unprivileged) process
    pub available_bytes: u64,
    /// Total size of the volume in bytes
    pub total_bytes: u64,
}

impl StorageStats {
    pub fn new(available_bytes: u64, total_bytes: u64) -> Self {
        Self {
            available_bytes,
            total_bytes,
        }
    }

    /// Bytes already in use on the volume.
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    /// Fraction of the volume that is still free (0.0 to 1.0).
    pub fn free_ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }

        self.available_bytes as f64 / self.total_bytes as f64
    }
}

/// File system access trait
///
/// Abstracts the file operations the cache needs to support different platforms:
/// - Desktop: Direct filesystem access
/// - iOS/Android: Sandboxed app directories, external media directories
///
/// Calls are synchronous: the cache core runs inside storage-engine callbacks
/// and never awaits.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// fn free_space(fs: &dyn FileSystemAccess) -> Result<u64> {
///     let root = fs.get_cache_directory()?;
///     Ok(fs.storage_stats(&root)?.available_bytes)
/// }
/// ```
pub trait FileSystemAccess: Send + Sync {
    /// Get the application's persistent data directory, if the platform
    /// currently exposes one (e.g. external storage may be unmounted).
    fn get_data_directory(&self) -> Option<PathBuf>;

    /// Get the application's cache directory
    ///
    /// This directory is always available but may be purged by the system
    /// when storage is low.
    fn get_cache_directory(&self) -> Result<PathBuf>;

    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Create a directory and all parent directories if they don't exist
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// List all entries in a directory
    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Query free and total space of the volume containing `path`
    fn storage_stats(&self, path: &Path) -> Result<StorageStats>;

    /// Calculate total size of a directory recursively
    fn directory_size(&self, path: &Path) -> Result<u64> {
        let mut total = 0u64;
        let entries = self.list_directory(path)?;

        for entry in entries {
            let metadata = self.metadata(&entry)?;
            if metadata.is_directory {
                total += self.directory_size(&entry)?;
            } else {
                total += metadata.size;
            }
        }

        Ok(total)
    }
}
