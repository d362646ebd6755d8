//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the cache core and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, Android, iOS).
//!
//! ## Traits
//!
//! - [`FileSystemAccess`](storage::FileSystemAccess) - App directories, directory
//!   creation, and free-space queries used to size and place the cache
//! - [`LoggerSink`](logging::LoggerSink) - Mirror cache warnings into host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for consistent
//! error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Include error context (e.g., file paths)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds: cache callbacks run on
//! whichever thread the storage engine performs I/O from.

pub mod error;
pub mod logging;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use logging::{LogLevel, LogRecord, LoggerSink};
pub use storage::{FileMetadata, FileSystemAccess, StorageStats};
