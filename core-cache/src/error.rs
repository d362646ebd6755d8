//! # Cache Error Types
//!
//! Error types for cache construction and span bookkeeping.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or operating the segment cache.
#[derive(Error, Debug)]
pub enum CacheError {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// The cache root directory could not be created or accessed.
    #[error("Cache storage unavailable at {path:?}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    /// Cache configuration was rejected before construction.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Span Errors
    // ========================================================================
    /// A cached span could not be removed from the storage engine.
    #[error("Failed to remove span of {key} at {position}: {reason}")]
    RemovalFailed {
        key: String,
        position: u64,
        reason: String,
    },

    /// The storage engine handle was used after `release()`.
    #[error("Cache has been released")]
    Released,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Error reported by a host bridge implementation.
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

impl CacheError {
    /// Returns `true` if the error prevents the cache from being constructed.
    ///
    /// Fatal errors surface from `acquire` and are never retried automatically.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CacheError::StorageUnavailable { .. }
                | CacheError::InvalidConfig(_)
                | CacheError::Bridge(_)
        )
    }

    /// Returns `true` if the error is absorbed locally during eviction.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CacheError::RemovalFailed { .. })
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
