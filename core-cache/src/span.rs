//! # Spans and Engine Contracts
//!
//! Types shared between a storage engine and its eviction policy.
//!
//! ```text
//! ┌──────────────────┐  on_start_file / on_span_added    ┌──────────────────┐
//! │  storage engine  │  on_span_removed / on_span_touched │   CacheEvictor   │
//! │   (SpanStore)    │ ─────────────────────────────────> │                  │
//! │                  │ <───────────────────────────────── │                  │
//! └──────────────────┘     cached_spans / remove_span     └──────────────────┘
//! ```
//!
//! The engine passes itself into every callback, so the evictor never keeps a
//! reference back to the engine.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// A contiguous cached byte range of one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheSpan {
    /// Logical resource the bytes belong to (e.g. a media URL)
    pub key: String,

    /// Byte offset of the range within the resource
    pub position: u64,

    /// Number of cached bytes
    pub length: u64,

    /// Milliseconds since the epoch of the last read or write
    pub last_touch_timestamp: i64,
}

impl CacheSpan {
    pub fn new(key: impl Into<String>, position: u64, length: u64) -> Self {
        Self {
            key: key.into(),
            position,
            length,
            last_touch_timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Copy of this span with a fresh touch timestamp.
    pub fn touched(&self) -> Self {
        Self {
            last_touch_timestamp: chrono::Utc::now()
                .timestamp_millis()
                .max(self.last_touch_timestamp),
            ..self.clone()
        }
    }

    /// Exclusive end offset of the range.
    pub fn end(&self) -> u64 {
        self.position.saturating_add(self.length)
    }

    /// Returns `true` if `offset` falls inside the range.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.position && offset < self.end()
    }
}

/// Operations an eviction policy may perform on the storage engine.
pub trait SpanStore: Send + Sync {
    /// All live spans of `key`, in position order.
    fn cached_spans(&self, key: &str) -> Vec<CacheSpan>;

    /// Removes one span from the engine's index.
    ///
    /// Implementations report the removal back through
    /// [`CacheEvictor::on_span_removed`] before returning, and fail with
    /// `CacheError::RemovalFailed` if the span is no longer present.
    fn remove_span(&self, span: &CacheSpan) -> Result<()>;
}

/// Eviction policy callbacks, invoked by the storage engine.
///
/// Callbacks may arrive concurrently from any thread. The policy calls back
/// into the [`SpanStore`] it is handed on the same thread, so any engine lock
/// held across a callback must be re-entrant and must be taken before the
/// policy's own.
pub trait CacheEvictor: Send + Sync {
    /// Whether the engine must report reads through `on_span_touched`.
    fn requires_span_touches(&self) -> bool;

    /// The engine finished (re)initializing its index.
    fn on_cache_initialized(&self);

    /// A write of `length` bytes (if known) at `position` of `key` is about to start.
    fn on_start_file(&self, store: &dyn SpanStore, key: &str, position: u64, length: Option<u64>);

    /// A span was committed to the index.
    fn on_span_added(&self, store: &dyn SpanStore, span: &CacheSpan);

    /// A span left the index.
    fn on_span_removed(&self, store: &dyn SpanStore, span: &CacheSpan);

    /// `old` was read and replaced by `new` with a fresh touch timestamp.
    fn on_span_touched(&self, store: &dyn SpanStore, old: &CacheSpan, new: &CacheSpan);
}

/// A storage engine the cache facade knows how to open and release.
pub trait CacheEngine: Send + Sync {
    /// Opens the engine over `directory`, delegating eviction to `evictor`.
    fn open(directory: PathBuf, evictor: Arc<dyn CacheEvictor>) -> Result<Self>
    where
        Self: Sized;

    /// Releases the engine's resources; later operations fail with `Released`.
    fn release(&self);
}
