//! Streams a few fake tracks through a small cache and prints what survives.
//!
//! ```sh
//! RUST_LOG=core_cache=debug cargo run -p core-cache --example cache_demo
//! ```

use anyhow::Context;
use bridge_desktop::StdFileSystem;
use bridge_traits::LogLevel;
use core_cache::{CacheConfig, CacheFacade};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::Arc;

const SEGMENT: u64 = 256 * 1024;

fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let temp = tempfile::tempdir().context("creating scratch directory")?;
    let fs = StdFileSystem::with_directories(temp.path().join("cache"), Some(temp.path().join("data")));

    // Pin the budget to 1MiB regardless of the disk this runs on.
    let config = CacheConfig::default()
        .with_min_size(4 * SEGMENT)
        .with_max_size(4 * SEGMENT)
        .with_cache_directory("demo_cache");
    let facade: CacheFacade = CacheFacade::new(config, Arc::new(fs));
    let cache = facade.acquire().context("building cache")?;

    for track in ["intro", "verse", "chorus"] {
        for segment in 0..2 {
            let position = segment * SEGMENT;
            cache.start_file(track, position, Some(SEGMENT))?;
            cache.commit_span(track, position, SEGMENT)?;
        }
        // Replay the opening so "intro" stays warm.
        cache.touch_span("intro", 0)?;
    }

    println!("cache directory: {}", cache.directory().display());
    println!("cached tracks:   {:?}", cache.keys());
    if let Some(stats) = facade.stats() {
        println!(
            "usage:           {} / {} bytes ({:.0}%), {} keys evicted",
            stats.total_bytes,
            stats.budget,
            stats.usage_percentage(),
            stats.keys_evicted
        );
    }

    facade.release();
    Ok(())
}
