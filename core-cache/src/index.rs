//! # Span Index
//!
//! In-memory storage engine index that drives an eviction policy.
//!
//! The index records which byte ranges of which keys are cached. The bytes
//! themselves are written elsewhere; `SpanIndex` only tracks the spans and
//! keeps the [`CacheEvictor`] informed of every change.
//!
//! All mutations run under one re-entrant lock that is also held while the
//! evictor is notified, so an add and its accounting are atomic with respect
//! to concurrent eviction sweeps. The evictor's calls back into
//! [`SpanStore`] re-enter that lock on the same thread.

use crate::error::{CacheError, Result};
use crate::span::{CacheEngine, CacheEvictor, CacheSpan, SpanStore};
use core_runtime::logging::{dir_label, redact_key};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

type SpanMap = HashMap<String, BTreeMap<u64, CacheSpan>>;

/// Span bookkeeping for one cache directory.
pub struct SpanIndex {
    directory: PathBuf,
    evictor: Arc<dyn CacheEvictor>,
    spans: ReentrantMutex<RefCell<SpanMap>>,
    released: AtomicBool,
}

impl std::fmt::Debug for SpanIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanIndex")
            .field("directory", &dir_label(&self.directory))
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl SpanIndex {
    /// Create an empty index over `directory` and initialize the evictor.
    pub fn new(directory: PathBuf, evictor: Arc<dyn CacheEvictor>) -> Self {
        let index = Self {
            directory,
            evictor,
            spans: ReentrantMutex::new(RefCell::new(HashMap::new())),
            released: AtomicBool::new(false),
        };

        {
            let _guard = index.spans.lock();
            index.evictor.on_cache_initialized();
        }

        info!(
            dir = %dir_label(&index.directory),
            "Span index opened"
        );
        index
    }

    /// Directory the indexed spans live in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_released() {
            return Err(CacheError::Released);
        }
        Ok(())
    }

    /// Announces a write so the evictor can make room first.
    ///
    /// `length` is `None` when the size of the incoming data is unknown.
    pub fn start_file(&self, key: &str, position: u64, length: Option<u64>) -> Result<()> {
        self.ensure_open()?;

        let _guard = self.spans.lock();
        self.evictor.on_start_file(self, key, position, length);
        Ok(())
    }

    /// Records `length` freshly written bytes of `key` at `position`.
    ///
    /// A span already indexed at the same position is replaced.
    pub fn commit_span(&self, key: &str, position: u64, length: u64) -> Result<CacheSpan> {
        self.ensure_open()?;

        let span = CacheSpan::new(key, position, length);
        let guard = self.spans.lock();
        let replaced = guard
            .borrow_mut()
            .entry(key.to_owned())
            .or_default()
            .insert(position, span.clone());

        if let Some(old) = replaced {
            debug!(key = %redact_key(key), position, "Replacing span");
            self.evictor.on_span_removed(self, &old);
        }
        self.evictor.on_span_added(self, &span);

        Ok(span)
    }

    /// Marks the span holding `offset` of `key` as read.
    ///
    /// Returns the refreshed span, or `None` if `offset` is not cached.
    pub fn touch_span(&self, key: &str, offset: u64) -> Result<Option<CacheSpan>> {
        self.ensure_open()?;

        let guard = self.spans.lock();
        let touched = {
            let mut spans = guard.borrow_mut();
            spans.get_mut(key).and_then(|by_position| {
                let (_, span) = by_position.range_mut(..=offset).next_back()?;
                if !span.contains(offset) {
                    return None;
                }
                let old = span.clone();
                *span = old.touched();
                Some((old, span.clone()))
            })
        };

        let Some((old, new)) = touched else {
            return Ok(None);
        };

        if self.evictor.requires_span_touches() {
            self.evictor.on_span_touched(self, &old, &new);
        }
        Ok(Some(new))
    }

    /// Number of contiguous cached bytes of `key` starting at `position`,
    /// capped at `length`.
    pub fn cached_length(&self, key: &str, position: u64, length: u64) -> u64 {
        let guard = self.spans.lock();
        let spans = guard.borrow();
        let Some(by_position) = spans.get(key) else {
            return 0;
        };

        let limit = position.saturating_add(length);
        let mut cursor = position;
        if let Some((_, first)) = by_position.range(..=position).next_back() {
            if first.contains(position) {
                cursor = first.end();
            }
        }
        for (_, span) in by_position.range(position.saturating_add(1)..) {
            if cursor >= limit || span.position > cursor {
                break;
            }
            cursor = cursor.max(span.end());
        }

        cursor.min(limit) - position
    }

    /// Drops every span of `key`, returning how many were removed.
    pub fn remove_key(&self, key: &str) -> Result<usize> {
        self.ensure_open()?;

        let _guard = self.spans.lock();
        let spans = self.cached_spans(key);
        for span in &spans {
            self.remove_span(span)?;
        }

        debug!(key = %redact_key(key), spans = spans.len(), "Removed key");
        Ok(spans.len())
    }

    /// Keys with at least one cached span, sorted.
    pub fn keys(&self) -> Vec<String> {
        let guard = self.spans.lock();
        let mut keys: Vec<String> = guard.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Total length of all indexed spans.
    pub fn cache_space(&self) -> u64 {
        let guard = self.spans.lock();
        let spans = guard.borrow();
        spans.values().flat_map(BTreeMap::values).map(|s| s.length).sum()
    }
}

impl SpanStore for SpanIndex {
    fn cached_spans(&self, key: &str) -> Vec<CacheSpan> {
        let guard = self.spans.lock();
        let spans = guard.borrow();
        spans
            .get(key)
            .map(|by_position| by_position.values().cloned().collect())
            .unwrap_or_default()
    }

    fn remove_span(&self, span: &CacheSpan) -> Result<()> {
        self.ensure_open()?;

        let guard = self.spans.lock();
        let removed = {
            let mut spans = guard.borrow_mut();
            let removed = spans
                .get_mut(&span.key)
                .and_then(|by_position| by_position.remove(&span.position));
            if spans.get(&span.key).is_some_and(BTreeMap::is_empty) {
                spans.remove(&span.key);
            }
            removed
        };

        let removed = removed.ok_or_else(|| CacheError::RemovalFailed {
            key: span.key.clone(),
            position: span.position,
            reason: "span is not indexed".to_string(),
        })?;

        self.evictor.on_span_removed(self, &removed);
        Ok(())
    }
}

impl CacheEngine for SpanIndex {
    fn open(directory: PathBuf, evictor: Arc<dyn CacheEvictor>) -> Result<Self> {
        Ok(Self::new(directory, evictor))
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        let guard = self.spans.lock();
        guard.borrow_mut().clear();
        info!(
            dir = %dir_label(&self.directory),
            "Span index released"
        );
    }
}
