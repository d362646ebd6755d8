//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the media cache core:
//! - Logging and tracing infrastructure
//! - Host log forwarding through `LoggerSink`
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions used throughout the system.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
