//! # Cache Facade
//!
//! Owns the process's single storage engine instance and builds it on first use.
//!
//! Construction wires the other components together:
//!
//! 1. [`CacheDirectoryResolver`] picks and creates the cache directory
//! 2. [`CapacityPlanner`] turns the volume's free space into a byte budget
//! 3. a fresh [`SegmentLruEvictor`] is bounded by that budget
//! 4. the engine is opened over the directory with the evictor attached
//!
//! The facade is an ordinary value: hosts construct one, share it behind an
//! `Arc`, and inject it wherever a cache handle is needed.

use crate::capacity::CapacityPlanner;
use crate::config::CacheConfig;
use crate::directory::CacheDirectoryResolver;
use crate::error::{CacheError, Result};
use crate::evictor::SegmentLruEvictor;
use crate::index::SpanIndex;
use crate::span::CacheEngine;
use crate::stats::EvictorStats;
use bridge_traits::storage::FileSystemAccess;
use core_runtime::logging::dir_label;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

struct Instance<E> {
    engine: Arc<E>,
    evictor: Arc<SegmentLruEvictor>,
    directory: PathBuf,
}

/// Lazily constructed, releasable cache handle.
pub struct CacheFacade<E: CacheEngine = SpanIndex> {
    config: CacheConfig,
    fs: Arc<dyn FileSystemAccess>,
    instance: RwLock<Option<Instance<E>>>,
}

impl<E: CacheEngine> CacheFacade<E> {
    /// Create a facade; nothing touches the filesystem until [`acquire`](Self::acquire).
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use core_cache::{CacheConfig, CacheFacade};
    /// use std::sync::Arc;
    ///
    /// let facade: CacheFacade = CacheFacade::new(CacheConfig::default(), filesystem);
    /// let cache = facade.acquire()?;
    /// ```
    pub fn new(config: CacheConfig, fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            config,
            fs,
            instance: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the engine, constructing it on the first call.
    ///
    /// Every call until the next [`release`](Self::release) returns the same
    /// handle. Construction failures are returned to the caller and leave the
    /// facade empty, so a later call retries.
    #[instrument(skip(self))]
    pub fn acquire(&self) -> Result<Arc<E>> {
        if let Some(instance) = self.instance.read().as_ref() {
            return Ok(instance.engine.clone());
        }

        let mut slot = self.instance.write();
        if let Some(instance) = slot.as_ref() {
            debug!("Cache constructed by a concurrent caller");
            return Ok(instance.engine.clone());
        }

        let instance = self.build()?;
        let engine = instance.engine.clone();
        *slot = Some(instance);
        Ok(engine)
    }

    fn build(&self) -> Result<Instance<E>> {
        self.config.validate().map_err(CacheError::InvalidConfig)?;

        let root = CacheDirectoryResolver::preferred_root(self.fs.as_ref())?;
        let directory =
            CacheDirectoryResolver::resolve(self.fs.as_ref(), &root, &self.config.cache_directory)?;
        let budget = CapacityPlanner::new(&self.config).plan_for_path(self.fs.as_ref(), &root)?;

        let evictor = Arc::new(SegmentLruEvictor::new(budget));
        let engine = Arc::new(E::open(directory.clone(), evictor.clone())?);

        info!(
            dir = %dir_label(&directory),
            budget,
            "Cache constructed"
        );
        Ok(Instance {
            engine,
            evictor,
            directory,
        })
    }

    /// Releases the engine; the next [`acquire`](Self::acquire) rebuilds it.
    ///
    /// A no-op if nothing has been acquired.
    #[instrument(skip(self))]
    pub fn release(&self) {
        let Some(instance) = self.instance.write().take() else {
            debug!("Release requested with no cache constructed");
            return;
        };

        instance.engine.release();
        info!(
            dir = %dir_label(&instance.directory),
            "Cache released"
        );
    }

    /// Returns `true` while a constructed engine is held.
    pub fn is_acquired(&self) -> bool {
        self.instance.read().is_some()
    }

    /// Eviction statistics of the current instance.
    pub fn stats(&self) -> Option<EvictorStats> {
        self.instance.read().as_ref().map(|i| i.evictor.stats())
    }

    /// Directory of the current instance.
    pub fn cache_directory(&self) -> Option<PathBuf> {
        self.instance.read().as_ref().map(|i| i.directory.clone())
    }
}
