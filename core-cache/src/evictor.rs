//! # Segment LRU Evictor
//!
//! Least-recently-used eviction across spans grouped by key.
//!
//! Recency is tracked per key with a logical clock: every span add and every
//! span touch stamps the key with the next clock value. When space is needed,
//! the key with the smallest stamp loses *all* of its spans at once.
//!
//! ## Locking
//!
//! The recency index, aggregate size and clock live behind one re-entrant
//! lock that is held for an entire eviction sweep. Removing a span calls back
//! into [`CacheEvictor::on_span_removed`] on the same thread, which re-enters
//! the lock; the `RefCell` inside is only borrowed between store calls.

use crate::span::{CacheEvictor, CacheSpan, SpanStore};
use crate::stats::EvictorStats;
use core_runtime::logging::redact_key;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

#[derive(Debug, Default)]
struct EvictorState {
    current_size: u64,
    clock: u64,
    access_order: HashMap<String, u64>,
    // Inverse of `access_order`; stamps are unique so this is a total order.
    by_stamp: BTreeMap<u64, String>,
    keys_evicted: u64,
    stale_keys_pruned: u64,
    removal_failures: u64,
}

impl EvictorState {
    fn reset(&mut self) {
        self.current_size = 0;
        self.access_order.clear();
        self.by_stamp.clear();
    }

    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn record_touch(&mut self, key: &str) {
        let stamp = self.next_stamp();
        if let Some(previous) = self.access_order.insert(key.to_owned(), stamp) {
            self.by_stamp.remove(&previous);
        }
        self.by_stamp.insert(stamp, key.to_owned());
    }

    fn record_add(&mut self, span: &CacheSpan) {
        self.current_size = self.current_size.saturating_add(span.length);
        self.record_touch(&span.key);
    }

    /// Returns `false` if the removal would have driven the size below zero.
    fn record_remove(&mut self, span: &CacheSpan) -> bool {
        match self.current_size.checked_sub(span.length) {
            Some(size) => {
                self.current_size = size;
                true
            }
            None => {
                self.current_size = 0;
                false
            }
        }
    }

    fn forget(&mut self, key: &str) {
        if let Some(stamp) = self.access_order.remove(key) {
            self.by_stamp.remove(&stamp);
        }
    }

    fn least_recent(&self) -> Option<&str> {
        self.by_stamp.values().next().map(String::as_str)
    }
}

/// LRU eviction policy bounded by a fixed byte budget.
#[derive(Debug)]
pub struct SegmentLruEvictor {
    max_bytes: u64,
    state: ReentrantMutex<RefCell<EvictorState>>,
}

impl SegmentLruEvictor {
    /// Create an evictor that keeps at most `max_bytes` cached.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            state: ReentrantMutex::new(RefCell::new(EvictorState::default())),
        }
    }

    /// The byte budget fixed at construction.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Sum of lengths of all live spans.
    pub fn current_size(&self) -> u64 {
        self.state.lock().borrow().current_size
    }

    /// Number of keys in the recency index.
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().borrow().access_order.len()
    }

    /// Returns `true` if `key` has a recency entry.
    pub fn is_tracked(&self, key: &str) -> bool {
        self.state.lock().borrow().access_order.contains_key(key)
    }

    /// Indexed keys from least to most recently used.
    pub fn recency_order(&self) -> Vec<String> {
        self.state.lock().borrow().by_stamp.values().cloned().collect()
    }

    pub fn stats(&self) -> EvictorStats {
        let guard = self.state.lock();
        let state = guard.borrow();

        EvictorStats {
            budget: self.max_bytes,
            total_bytes: state.current_size,
            tracked_keys: state.access_order.len(),
            keys_evicted: state.keys_evicted,
            stale_keys_pruned: state.stale_keys_pruned,
            removal_failures: state.removal_failures,
            calculated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Evicts least-recently-used keys until `required_space` more bytes fit
    /// in the budget, or nothing is left to evict.
    ///
    /// An incoming write larger than the whole budget empties the index but is
    /// not rejected; admission stays the engine's decision.
    fn evict_cache(&self, state: &RefCell<EvictorState>, store: &dyn SpanStore, required_space: u64) {
        loop {
            let victim = {
                let state = state.borrow();
                if state.current_size.saturating_add(required_space) <= self.max_bytes {
                    return;
                }
                match state.least_recent() {
                    Some(key) => key.to_owned(),
                    None => return,
                }
            };

            let spans = store.cached_spans(&victim);
            if spans.is_empty() {
                warn!(key = %redact_key(&victim), "Pruning stale recency entry");
                let mut state = state.borrow_mut();
                state.forget(&victim);
                state.stale_keys_pruned += 1;
                continue;
            }

            for span in &spans {
                if let Err(e) = store.remove_span(span) {
                    warn!(
                        key = %redact_key(&victim),
                        position = span.position,
                        length = span.length,
                        "Span removal failed during eviction: {}",
                        e
                    );
                    state.borrow_mut().removal_failures += 1;
                }
            }

            let mut state = state.borrow_mut();
            state.forget(&victim);
            state.keys_evicted += 1;
            debug!(
                key = %redact_key(&victim),
                spans = spans.len(),
                current_size = state.current_size,
                budget = self.max_bytes,
                "Evicted key"
            );
        }
    }
}

impl CacheEvictor for SegmentLruEvictor {
    fn requires_span_touches(&self) -> bool {
        true
    }

    fn on_cache_initialized(&self) {
        self.state.lock().borrow_mut().reset();
        debug!(budget = self.max_bytes, "Evictor initialized");
    }

    fn on_start_file(&self, store: &dyn SpanStore, key: &str, position: u64, length: Option<u64>) {
        let Some(length) = length else {
            trace!(key = %redact_key(key), position, "Write of unknown length, skipping pre-write eviction");
            return;
        };

        let guard = self.state.lock();
        self.evict_cache(&guard, store, length);
    }

    fn on_span_added(&self, store: &dyn SpanStore, span: &CacheSpan) {
        let guard = self.state.lock();
        guard.borrow_mut().record_add(span);
        trace!(key = %redact_key(&span.key), length = span.length, "Span added");

        // Spans committed without a preceding start notification, or by a
        // concurrent writer, are reconciled here.
        self.evict_cache(&guard, store, 0);
    }

    fn on_span_removed(&self, _store: &dyn SpanStore, span: &CacheSpan) {
        let guard = self.state.lock();
        if !guard.borrow_mut().record_remove(span) {
            warn!(
                key = %redact_key(&span.key),
                length = span.length,
                "Removed span was larger than the tracked total, clamping to zero"
            );
        }
    }

    fn on_span_touched(&self, _store: &dyn SpanStore, _old: &CacheSpan, new: &CacheSpan) {
        self.state.lock().borrow_mut().record_touch(&new.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheError, Result};
    use mockall::mock;
    use mockall::predicate::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    mock! {
        pub Store {}

        impl SpanStore for Store {
            fn cached_spans(&self, key: &str) -> Vec<CacheSpan>;
            fn remove_span(&self, span: &CacheSpan) -> Result<()>;
        }
    }

    /// Minimal engine stand-in that reports removals back to the evictor.
    struct FakeStore {
        evictor: Arc<SegmentLruEvictor>,
        spans: Mutex<BTreeMap<String, Vec<CacheSpan>>>,
        removed: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new(budget: u64) -> Self {
            let evictor = Arc::new(SegmentLruEvictor::new(budget));
            evictor.on_cache_initialized();
            Self {
                evictor,
                spans: Mutex::new(BTreeMap::new()),
                removed: Mutex::new(Vec::new()),
            }
        }

        fn write(&self, key: &str, length: u64) {
            let position = self.spans.lock().get(key).map_or(0, |s| {
                s.last().map_or(0, CacheSpan::end)
            });
            self.evictor.on_start_file(self, key, position, Some(length));
            let span = CacheSpan::new(key, position, length);
            self.spans
                .lock()
                .entry(key.to_string())
                .or_default()
                .push(span.clone());
            self.evictor.on_span_added(self, &span);
        }

        fn read(&self, key: &str) {
            let span = self.spans.lock().get(key).and_then(|s| s.first().cloned());
            if let Some(old) = span {
                let new = old.touched();
                self.evictor.on_span_touched(self, &old, &new);
            }
        }

        fn live_bytes(&self) -> u64 {
            self.spans.lock().values().flatten().map(|s| s.length).sum()
        }

        fn has_key(&self, key: &str) -> bool {
            self.spans.lock().contains_key(key)
        }
    }

    impl SpanStore for FakeStore {
        fn cached_spans(&self, key: &str) -> Vec<CacheSpan> {
            self.spans.lock().get(key).cloned().unwrap_or_default()
        }

        fn remove_span(&self, span: &CacheSpan) -> Result<()> {
            {
                let mut spans = self.spans.lock();
                let list = spans.get_mut(&span.key).ok_or_else(|| CacheError::RemovalFailed {
                    key: span.key.clone(),
                    position: span.position,
                    reason: "unknown key".to_string(),
                })?;
                list.retain(|s| s.position != span.position);
                if list.is_empty() {
                    spans.remove(&span.key);
                }
            }
            self.removed.lock().push(span.key.clone());
            self.evictor.on_span_removed(self, span);
            Ok(())
        }
    }

    #[test]
    fn test_add_within_budget_does_not_evict() {
        let store = FakeStore::new(1000);
        store.write("a", 600);

        assert_eq!(store.evictor.current_size(), 600);
        assert!(store.has_key("a"));
        assert_eq!(store.evictor.stats().keys_evicted, 0);
    }

    #[test]
    fn test_start_file_frees_space_before_write() {
        let store = FakeStore::new(1000);
        store.write("a", 600);
        store.write("b", 600);

        assert!(!store.has_key("a"));
        assert!(store.has_key("b"));
        assert_eq!(store.evictor.current_size(), 600);
        assert_eq!(store.evictor.recency_order(), vec!["b".to_string()]);
        assert_eq!(store.evictor.stats().keys_evicted, 1);
    }

    #[test]
    fn test_touch_refreshes_recency() {
        let store = FakeStore::new(1000);
        store.write("a", 100);
        store.write("b", 100);
        store.write("c", 100);
        store.read("a");

        assert_eq!(store.evictor.recency_order(), vec!["b", "c", "a"]);

        // Needs everything: evicts b, then c, then a.
        store.write("d", 1000);
        assert_eq!(*store.removed.lock(), vec!["b", "c", "a"]);
        assert!(!store.has_key("a") && !store.has_key("b") && !store.has_key("c"));
        assert_eq!(store.evictor.recency_order(), vec!["d"]);
        assert_eq!(store.evictor.current_size(), 1000);
    }

    #[test]
    fn test_evicts_only_as_many_keys_as_needed() {
        let store = FakeStore::new(1000);
        store.write("a", 300);
        store.write("b", 300);
        store.write("c", 300);
        store.read("a");

        store.write("d", 200);
        assert!(!store.has_key("b"));
        assert!(store.has_key("a") && store.has_key("c") && store.has_key("d"));
        assert_eq!(store.evictor.current_size(), 800);
    }

    #[test]
    fn test_key_level_granularity_removes_every_span() {
        let store = FakeStore::new(1000);
        store.write("a", 200);
        store.write("a", 200);
        store.write("a", 200);
        store.write("b", 100);

        assert_eq!(store.cached_spans("a").len(), 3);
        store.write("c", 400);

        assert!(store.cached_spans("a").is_empty());
        assert_eq!(store.evictor.current_size(), 500);
    }

    #[test]
    fn test_oversized_write_is_admitted_then_reclaimed() {
        let store = FakeStore::new(1000);
        store.write("a", 400);
        store.write("b", 400);

        store.write("huge", 5000);

        // The pre-write sweep empties the index, the write still lands, and the
        // post-add sweep reclaims it because nothing else is left to evict.
        assert!(!store.has_key("a") && !store.has_key("b") && !store.has_key("huge"));
        assert_eq!(store.evictor.tracked_keys(), 0);
        assert_eq!(store.evictor.current_size(), 0);
        assert_eq!(store.evictor.stats().keys_evicted, 3);
    }

    #[test]
    fn test_unknown_length_skips_pre_write_eviction() {
        let store = FakeStore::new(1000);
        store.write("a", 900);

        let mut mock = MockStore::new();
        mock.expect_cached_spans().times(0);
        mock.expect_remove_span().times(0);
        store.evictor.on_start_file(&mock, "b", 0, None);

        assert_eq!(store.evictor.current_size(), 900);
    }

    #[test]
    fn test_size_matches_live_spans() {
        let store = FakeStore::new(2500);
        let lengths = [700u64, 300, 1200, 50, 900, 400, 1000, 10, 600];
        for (i, len) in lengths.iter().enumerate() {
            store.write(&format!("k{}", i % 4), *len);
            if i % 3 == 0 {
                store.read("k1");
            }
            assert_eq!(store.evictor.current_size(), store.live_bytes());
            assert!(store.evictor.current_size() <= 2500 || store.evictor.tracked_keys() == 0);
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = FakeStore::new(1000);
        store.write("a", 100);
        store.write("b", 100);

        store.evictor.on_cache_initialized();
        let once = (store.evictor.current_size(), store.evictor.recency_order());
        store.evictor.on_cache_initialized();
        let twice = (store.evictor.current_size(), store.evictor.recency_order());

        assert_eq!(once, (0, Vec::<String>::new()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stale_key_is_pruned_without_removal() {
        let evictor = SegmentLruEvictor::new(100);
        let mut mock = MockStore::new();
        mock.expect_cached_spans()
            .with(eq("ghost"))
            .times(1)
            .returning(|_| Vec::new());
        mock.expect_cached_spans()
            .with(eq("live"))
            .returning(|_| Vec::new());
        mock.expect_remove_span().times(0);

        // Committed against a store that never evicts.
        let mut quiet = MockStore::new();
        quiet.expect_cached_spans().times(0);
        evictor.on_span_added(&quiet, &CacheSpan::new("ghost", 0, 60));
        evictor.on_span_removed(&quiet, &CacheSpan::new("ghost", 0, 60));
        evictor.on_span_added(&quiet, &CacheSpan::new("live", 0, 60));

        evictor.on_start_file(&mock, "next", 0, Some(50));

        let stats = evictor.stats();
        assert!(!evictor.is_tracked("ghost"));
        assert_eq!(stats.stale_keys_pruned, 2);
        assert_eq!(stats.keys_evicted, 0);
        assert_eq!(stats.total_bytes, 60);
    }

    #[test]
    fn test_failed_removals_do_not_stall_eviction() {
        let evictor = SegmentLruEvictor::new(1000);

        let mut quiet = MockStore::new();
        quiet.expect_cached_spans().times(0);
        evictor.on_span_added(&quiet, &CacheSpan::new("a", 0, 600));

        let mut failing = MockStore::new();
        failing
            .expect_cached_spans()
            .returning(|key| vec![CacheSpan::new(key, 0, 600)]);
        failing.expect_remove_span().times(2).returning(|span| {
            Err(CacheError::RemovalFailed {
                key: span.key.clone(),
                position: span.position,
                reason: "locked by reader".to_string(),
            })
        });
        evictor.on_span_added(&failing, &CacheSpan::new("b", 0, 600));

        let stats = evictor.stats();
        assert_eq!(stats.tracked_keys, 0);
        assert_eq!(stats.removal_failures, 2);
        assert_eq!(stats.keys_evicted, 2);
        assert_eq!(stats.total_bytes, 1200);
    }

    #[test]
    fn test_unmatched_removal_clamps_to_zero() {
        let evictor = SegmentLruEvictor::new(1000);
        let mut quiet = MockStore::new();
        quiet.expect_cached_spans().times(0);

        evictor.on_span_added(&quiet, &CacheSpan::new("a", 0, 10));
        evictor.on_span_removed(&quiet, &CacheSpan::new("a", 0, 50));
        assert_eq!(evictor.current_size(), 0);
    }

    #[test]
    fn test_requires_touches() {
        assert!(SegmentLruEvictor::new(1).requires_span_touches());
    }
}
