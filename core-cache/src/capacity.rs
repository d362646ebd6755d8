//! # Capacity Planning
//!
//! Derives the cache byte budget from the free space of the backing volume.
//! Sizing relative to free space keeps the cache from starving the device,
//! while the floor and ceiling rule out a near-zero cache on a full disk and
//! unbounded growth on an empty one.

use crate::config::CacheConfig;
use crate::error::Result;
use bridge_traits::storage::FileSystemAccess;
use std::path::Path;
use tracing::debug;

/// Computes `clamp(available_bytes * fraction, floor, ceiling)`.
///
/// Malformed input (`floor > ceiling`, fraction outside `(0, 1]`) is the
/// caller's problem; the result is still well-defined and never panics.
pub fn plan(available_bytes: u64, floor: u64, ceiling: u64, fraction: f64) -> u64 {
    let calculated = (available_bytes as f64 * fraction) as u64;

    if calculated < floor {
        floor
    } else if calculated > ceiling {
        ceiling
    } else {
        calculated
    }
}

/// Budget planner bound to a [`CacheConfig`].
#[derive(Debug, Clone)]
pub struct CapacityPlanner {
    floor: u64,
    ceiling: u64,
    fraction: f64,
}

impl CapacityPlanner {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            floor: config.min_cache_size_bytes,
            ceiling: config.max_cache_size_bytes,
            fraction: config.available_fraction,
        }
    }

    /// Budget for a volume with `available_bytes` free.
    pub fn budget_for(&self, available_bytes: u64) -> u64 {
        plan(available_bytes, self.floor, self.ceiling, self.fraction)
    }

    /// Queries the host for the free space under `root` and plans from it.
    pub fn plan_for_path(&self, fs: &dyn FileSystemAccess, root: &Path) -> Result<u64> {
        let stats = fs.storage_stats(root)?;
        let budget = self.budget_for(stats.available_bytes);

        debug!(
            available_bytes = stats.available_bytes,
            total_bytes = stats.total_bytes,
            budget,
            "Planned cache budget"
        );
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_up_to_floor() {
        assert_eq!(plan(1000, 500, 10_000, 0.2), 500);
    }

    #[test]
    fn test_clamped_down_to_ceiling() {
        assert_eq!(
            plan(1_000_000_000_000, 500, 10_000_000_000, 0.2),
            10_000_000_000
        );
    }

    #[test]
    fn test_fraction_within_bounds() {
        assert_eq!(
            plan(100_000_000_000, 500, 10_000_000_000_000, 0.2),
            20_000_000_000
        );
    }

    #[test]
    fn test_nothing_available_yields_floor() {
        assert_eq!(plan(0, 500, 10_000, 0.2), 500);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        // Floor wins when the computed value is below it.
        assert_eq!(plan(10, 1000, 100, 0.5), 1000);
        assert_eq!(plan(1_000_000, 1000, 100, 0.5), 100);
    }

    #[test]
    fn test_planner_uses_config() {
        let config = CacheConfig::default()
            .with_min_size(100)
            .with_max_size(1_000)
            .with_available_fraction(0.5);
        let planner = CapacityPlanner::new(&config);

        assert_eq!(planner.budget_for(50), 100);
        assert_eq!(planner.budget_for(1_000), 500);
        assert_eq!(planner.budget_for(1_000_000), 1_000);
    }
}
