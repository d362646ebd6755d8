//! Host log forwarding
//!
//! Cache warnings (failed removals, stale recency entries) happen deep inside
//! storage-engine callbacks where the host cannot see them. A [`LoggerSink`]
//! lets the host receive those events in its own logging pipeline
//! (Logcat, OSLog, a desktop log file).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive name understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event mirrored to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    /// Emitting module, e.g. `core_cache::evictor`
    pub target: String,
    pub message: String,
    /// Structured fields in name order (`key`, `position`, `budget`, ...)
    pub fields: BTreeMap<String, String>,
    /// Milliseconds since the epoch
    pub timestamp_ms: i64,
}

impl LogRecord {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Receives cache log records on the host side.
///
/// Called synchronously on whichever thread emitted the event, which is often
/// a storage I/O thread. Implementations should queue rather than block.
pub trait LoggerSink: Send + Sync {
    fn log(&self, record: LogRecord) -> Result<()>;

    /// Records below this level are dropped before they are built.
    fn min_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}
