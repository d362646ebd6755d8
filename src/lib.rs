//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-cache`, `core-runtime`, `bridge-desktop`).
//! Host applications can depend on `media-cache-workspace` and enable the
//! documented features without needing to wire each crate individually.

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
#[cfg(feature = "desktop-shims")]
pub use core_cache;
#[cfg(feature = "desktop-shims")]
pub use core_runtime;
