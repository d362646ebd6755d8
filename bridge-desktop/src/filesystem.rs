//! File System Access Implementation using the standard library

use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileMetadata, FileSystemAccess, StorageStats},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIRECTORY: &str = "media-cache-core";

/// Desktop file system implementation
///
/// Provides blocking file operations using:
/// - `std::fs` for directory and metadata operations
/// - `dirs` for platform-specific app directories
/// - `fs2` for free/total space of the backing volume
pub struct StdFileSystem {
    cache_dir: PathBuf,
    data_dir: Option<PathBuf>,
}

impl StdFileSystem {
    /// Create a new file system accessor with default directories
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIRECTORY);

        let data_dir = dirs::data_dir().map(|dir| dir.join(APP_DIRECTORY));

        Self {
            cache_dir,
            data_dir,
        }
    }

    /// Create a new file system accessor with custom directories
    pub fn with_directories(cache_dir: PathBuf, data_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            data_dir,
        }
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }

    fn unix_seconds(time: std::io::Result<std::time::SystemTime>) -> Option<i64> {
        time.ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
    }
}

impl Default for StdFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemAccess for StdFileSystem {
    fn get_data_directory(&self) -> Option<PathBuf> {
        self.data_dir.clone()
    }

    fn get_cache_directory(&self) -> Result<PathBuf> {
        // Ensure cache directory exists
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).map_err(Self::map_io_error)?;
            debug!(path = ?self.cache_dir, "Created cache directory");
        }
        Ok(self.cache_dir.clone())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        path.try_exists().map_err(Self::map_io_error)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::metadata(path).map_err(Self::map_io_error)?;

        Ok(FileMetadata {
            size: metadata.len(),
            created_at: Self::unix_seconds(metadata.created()),
            modified_at: Self::unix_seconds(metadata.modified()),
            is_directory: metadata.is_dir(),
        })
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(Self::map_io_error)? {
            entries.push(entry.map_err(Self::map_io_error)?.path());
        }

        debug!(path = ?path, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    fn storage_stats(&self, path: &Path) -> Result<StorageStats> {
        let available_bytes = fs2::available_space(path).map_err(Self::map_io_error)?;
        let total_bytes = fs2::total_space(path).map_err(Self::map_io_error)?;

        debug!(
            path = ?path,
            available_bytes,
            total_bytes,
            "Queried storage stats"
        );
        Ok(StorageStats::new(available_bytes, total_bytes))
    }
}
