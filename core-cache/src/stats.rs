//! Eviction statistics and monitoring

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of the eviction policy's bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvictorStats {
    /// Maximum permitted total size in bytes
    pub budget: u64,

    /// Sum of lengths of all live spans
    pub total_bytes: u64,

    /// Number of keys in the recency index
    pub tracked_keys: usize,

    /// Keys whose spans were evicted since construction
    pub keys_evicted: u64,

    /// Index entries dropped because the engine had no spans for them
    pub stale_keys_pruned: u64,

    /// Span removals the engine refused during eviction
    pub removal_failures: u64,

    /// Timestamp when stats were calculated
    pub calculated_at: i64,
}

impl EvictorStats {
    /// Calculate cache usage as a percentage of the budget.
    pub fn usage_percentage(&self) -> f64 {
        if self.budget == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / self.budget as f64) * 100.0
    }

    /// Returns true if the cache is near capacity (>90%).
    pub fn is_near_capacity(&self) -> bool {
        self.usage_percentage() > 90.0
    }

    /// Returns true if more bytes are cached than the budget allows.
    ///
    /// Only possible transiently, or after an oversized write or failed removals.
    pub fn is_over_budget(&self) -> bool {
        self.total_bytes > self.budget
    }

    /// Bytes that can still be written without triggering eviction.
    pub fn headroom(&self) -> u64 {
        self.budget.saturating_sub(self.total_bytes)
    }

    /// Bytes that must be reclaimed to get back under budget.
    pub fn space_needed(&self) -> u64 {
        self.total_bytes.saturating_sub(self.budget)
    }

    /// Returns average cached bytes per tracked key.
    pub fn average_key_size(&self) -> u64 {
        if self.tracked_keys == 0 {
            0
        } else {
            self.total_bytes / self.tracked_keys as u64
        }
    }
}
