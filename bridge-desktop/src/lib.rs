//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate libraries:
//! - `FileSystemAccess` using `std::fs`, `dirs` for platform app directories,
//!   and `fs2` for volume free-space queries
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::StdFileSystem;
//! use bridge_traits::FileSystemAccess;
//!
//! let fs = StdFileSystem::new();
//! let root = fs.get_cache_directory()?;
//! let stats = fs.storage_stats(&root)?;
//! ```

mod filesystem;

pub use filesystem::StdFileSystem;
