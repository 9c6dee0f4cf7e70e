//! Point-in-time copies of the operation counters.

/// Snapshot of [`SplayCache`](crate::policy::splay::SplayCache) counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplayMetricsSnapshot {
    pub search_calls: u64,
    pub search_hits: u64,
    pub search_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub rotations: u64,
    pub cache_len: usize,
}

/// Snapshot of [`BoundedLruCache`](crate::policy::lru::BoundedLruCache)
/// counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evictions: u64,
    pub invalidate_calls: u64,
    pub invalidated_entries: u64,
    pub cache_len: usize,
    pub capacity: usize,
}
