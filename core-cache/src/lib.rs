//! # Segment Cache Core
//!
//! Size-bounded, segment-granular LRU eviction for a media byte-range cache.
//!
//! ## Overview
//!
//! A storage engine caches byte ranges ([`CacheSpan`]s) of remote media keyed by
//! resource. This crate decides how large that cache may grow and which ranges
//! to drop when it is full:
//!
//! - [`CapacityPlanner`] - Derives a byte budget from free space on the volume
//! - [`CacheDirectoryResolver`] - Picks and creates the on-disk cache directory
//! - [`SegmentLruEvictor`] - Evicts least-recently-used keys to stay within budget
//! - [`SpanIndex`] - In-memory span bookkeeping that drives the evictor
//! - [`CacheFacade`] - Builds the engine once and hands out the shared handle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_cache::{CacheConfig, CacheFacade};
//!
//! let facade: CacheFacade = CacheFacade::new(CacheConfig::default(), filesystem);
//! let cache = facade.acquire()?;
//!
//! cache.start_file("https://cdn.example.com/track.mp3", 0, Some(64 * 1024))?;
//! cache.commit_span("https://cdn.example.com/track.mp3", 0, 64 * 1024)?;
//! ```
//!
//! ## Thread Safety
//!
//! Every type here is `Send + Sync`. Evictor callbacks may arrive from any
//! reader or writer thread; see [`span`] for the locking contract between an
//! engine and its policy.

pub mod capacity;
pub mod config;
pub mod directory;
pub mod error;
pub mod evictor;
pub mod facade;
pub mod index;
pub mod span;
pub mod stats;

pub use capacity::{plan, CapacityPlanner};
pub use config::CacheConfig;
pub use directory::CacheDirectoryResolver;
pub use error::{CacheError, Result};
pub use evictor::SegmentLruEvictor;
pub use facade::CacheFacade;
pub use index::SpanIndex;
pub use span::{CacheEngine, CacheEvictor, CacheSpan, SpanStore};
pub use stats::EvictorStats;
