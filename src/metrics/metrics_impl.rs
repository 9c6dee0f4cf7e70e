//! Counter storage and recording hooks.

/// Operation counters for [`SplayCache`](crate::policy::splay::SplayCache).
#[derive(Debug, Default, Clone)]
pub struct SplayMetrics {
    pub(crate) search_calls: u64,
    pub(crate) search_hits: u64,
    pub(crate) search_misses: u64,
    pub(crate) insert_calls: u64,
    pub(crate) insert_updates: u64,
    pub(crate) insert_new: u64,
    pub(crate) rotations: u64,
}

impl SplayMetrics {
    #[inline]
    pub(crate) fn record_search_hit(&mut self) {
        self.search_calls += 1;
        self.search_hits += 1;
    }

    #[inline]
    pub(crate) fn record_search_miss(&mut self) {
        self.search_calls += 1;
        self.search_misses += 1;
    }

    #[inline]
    pub(crate) fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    #[inline]
    pub(crate) fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    pub(crate) fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    pub(crate) fn record_rotation(&mut self) {
        self.rotations += 1;
    }
}

/// Operation counters for
/// [`BoundedLruCache`](crate::policy::lru::BoundedLruCache).
#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub(crate) get_calls: u64,
    pub(crate) get_hits: u64,
    pub(crate) get_misses: u64,
    pub(crate) insert_calls: u64,
    pub(crate) insert_updates: u64,
    pub(crate) insert_new: u64,
    pub(crate) evictions: u64,
    pub(crate) invalidate_calls: u64,
    pub(crate) invalidated_entries: u64,
}

impl LruMetrics {
    #[inline]
    pub(crate) fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    #[inline]
    pub(crate) fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    #[inline]
    pub(crate) fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    #[inline]
    pub(crate) fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    pub(crate) fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    pub(crate) fn record_invalidate_call(&mut self) {
        self.invalidate_calls += 1;
    }

    #[inline]
    pub(crate) fn record_invalidated_entries(&mut self, count: u64) {
        self.invalidated_entries += count;
    }
}
