//! Bounded LRU cache with predicate-based bulk invalidation.
//!
//! Backing layout is a hash index plus an intrusive doubly linked recency
//! list, updated together on every operation:
//! - `FxHashMap<K, NonNull<Node>>` for O(1) key lookup
//! - linked list `head` (MRU) to `tail` (LRU) for O(1) promotion and eviction
//!
//! ```text
//!   get(B) / insert(B, _) promote B:
//!
//!     head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!                           │
//!                           ▼
//!     head ──► [B] ◄──► [A] ◄──► [C] ◄── tail
//!              MRU                LRU
//! ```
//!
//! Capacity is fixed at construction and must be positive; an insert that
//! would exceed it evicts exactly the current LRU entry, silently. The cache
//! is best-effort memoization, never an authoritative store.
//!
//! [`BoundedLruCache::invalidate`] removes every entry matching a caller
//! predicate in one O(len) pass. There is deliberately no secondary index
//! over keys: callers that invalidate by range accept the linear scan.

use std::fmt;
use std::hash::Hash;
use std::mem;
use std::ptr::NonNull;

#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
use crate::traits::{LruCacheTrait, MemoCache};

/// Node in the recency list.
///
/// Linked list pointers first for fast traversal; the key is needed for map
/// removal during eviction and for invalidation predicates.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    key: K,
    value: V,
}

/// A fixed-capacity cache with least-recently-used eviction.
///
/// Values are stored directly without `Arc` wrapping: memoized aggregates are
/// small and cheap to clone, and nothing needs to outlive eviction.
///
/// # Example
///
/// ```
/// use memokit::policy::lru::BoundedLruCache;
///
/// let mut cache = BoundedLruCache::new(2);
/// cache.insert((0u32, 5u32), 10i64);
/// cache.insert((1, 6), 20);
///
/// assert_eq!(cache.get(&(0, 5)), Some(&10)); // promotes (0, 5)
///
/// cache.insert((2, 7), 30); // evicts (1, 6), the LRU entry
/// assert_eq!(cache.get(&(1, 6)), None);
/// assert_eq!(cache.get(&(0, 5)), Some(&10));
/// ```
pub struct BoundedLruCache<K, V> {
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> BoundedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero. A bounded cache that
    /// can hold nothing is a configuration mistake, not a degenerate mode.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Creates a cache with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid BoundedLruCache configuration: {err}"),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the maximum capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if the key exists. Does not update recency order.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Gets a reference to a value, promoting the entry to MRU.
    ///
    /// A miss mutates nothing.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let node_ptr = match self.map.get(key) {
            Some(&ptr) => ptr,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            }
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.detach(node_ptr);
        self.attach_front(node_ptr);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        // SAFETY: node_ptr is valid as long as it's in the map
        Some(unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Peeks at a value without updating recency order.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map
            .get(key)
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// existed.
    ///
    /// An existing key is overwritten and promoted to MRU. A new key is
    /// inserted at MRU; if the cache is at capacity, the current LRU entry
    /// is evicted first. Capacity is exceeded by at most one per call, so
    /// exactly one entry is evicted. Eviction is silent.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(&node_ptr) = self.map.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let previous = unsafe {
                let node = node_ptr.as_ptr();
                mem::replace(&mut (*node).value, value)
            };

            self.detach(node_ptr);
            self.attach_front(node_ptr);

            #[cfg(debug_assertions)]
            self.validate_invariants();

            return Some(previous);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.map.len() >= self.capacity {
            if self.pop_lru().is_some() {
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
            }
        }

        let node = Box::new(Node {
            prev: None,
            next: None,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::new(Box::into_raw(node)).unwrap();

        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node_ptr = self.map.remove(key)?;

        self.detach(node_ptr);
        // SAFETY: we own the node after removing it from the map
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Some(node.value)
    }

    /// Removes every entry whose key satisfies `predicate`, irrespective of
    /// recency position. Returns the number of entries removed.
    ///
    /// Single O(len) pass over the recency list; there is no secondary index
    /// over keys. Typical use: after an external mutation, drop all cached
    /// aggregates whose underlying range covers the mutated index.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::policy::lru::BoundedLruCache;
    ///
    /// let mut cache = BoundedLruCache::new(8);
    /// cache.insert((0u32, 4u32), 1i64);
    /// cache.insert((3, 9), 2);
    /// cache.insert((6, 8), 3);
    ///
    /// // Index 4 was mutated: drop every span containing it.
    /// let removed = cache.invalidate(|&(l, r)| l <= 4 && 4 <= r);
    /// assert_eq!(removed, 2);
    /// assert!(cache.contains(&(6, 8)));
    /// ```
    pub fn invalidate<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_invalidate_call();

        let mut removed = 0usize;
        let mut current = self.head;
        while let Some(node_ptr) = current {
            // SAFETY: every pointer in the list is a live node owned by this
            // cache; read the successor before a potential removal.
            let next = unsafe { (*node_ptr.as_ptr()).next };
            let matches = unsafe { predicate(&(*node_ptr.as_ptr()).key) };
            if matches {
                unsafe {
                    self.map.remove(&(*node_ptr.as_ptr()).key);
                }
                self.detach(node_ptr);
                // SAFETY: detached and removed from the map; sole owner now
                drop(unsafe { Box::from_raw(node_ptr.as_ptr()) });
                removed += 1;
            }
            current = next;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_invalidated_entries(removed as u64);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        removed
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let tail_ptr = self.tail?;

        // SAFETY: tail is a live node if Some
        let key = unsafe { (*tail_ptr.as_ptr()).key.clone() };

        self.map.remove(&key);
        self.detach(tail_ptr);
        let node = unsafe { Box::from_raw(tail_ptr.as_ptr()) };

        Some((node.key, node.value))
    }

    /// Peeks at the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|node_ptr| unsafe {
            let node = node_ptr.as_ptr();
            (&(*node).key, &(*node).value)
        })
    }

    /// Promotes an existing entry to MRU without returning its value.
    ///
    /// Returns `true` if the key existed.
    #[inline]
    pub fn touch(&mut self, key: &K) -> bool {
        if let Some(&node_ptr) = self.map.get(key) {
            self.detach(node_ptr);
            self.attach_front(node_ptr);

            #[cfg(debug_assertions)]
            self.validate_invariants();

            true
        } else {
            false
        }
    }

    /// Returns the entry's position in recency order, 0 = MRU. O(len) scan.
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        let &target_ptr = self.map.get(key)?;
        let mut rank = 0usize;
        let mut current = self.head;

        while let Some(ptr) = current {
            if ptr == target_ptr {
                return Some(rank);
            }
            rank += 1;
            current = unsafe { ptr.as_ref().next };
        }
        None
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        while self.pop_lru().is_some() {}
        self.map.clear();
    }

    // =========================================================================
    // Internal linked-list operations
    // =========================================================================

    /// Detaches a node from its current position in the list.
    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ptr();
            let prev = (*node).prev;
            let next = (*node).next;

            match prev {
                Some(prev_ptr) => (*prev_ptr.as_ptr()).next = next,
                None => self.head = next,
            }

            match next {
                Some(next_ptr) => (*next_ptr.as_ptr()).prev = prev,
                None => self.tail = prev,
            }

            (*node).prev = None;
            (*node).next = None;
        }
    }

    /// Attaches a node at the front (MRU position) of the list.
    #[inline(always)]
    fn attach_front(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ptr();
            (*node).prev = None;
            (*node).next = self.head;

            match self.head {
                Some(head_ptr) => (*head_ptr.as_ptr()).prev = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }

            self.head = Some(node_ptr);
        }
    }

    /// Validates internal invariants (debug builds only).
    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        if self.map.is_empty() {
            debug_assert!(self.head.is_none());
            debug_assert!(self.tail.is_none());
            return;
        }

        let mut count = 0usize;
        let mut current = self.head;
        while let Some(ptr) = current {
            count += 1;
            unsafe {
                let node = ptr.as_ref();
                debug_assert!(self.map.contains_key(&node.key));
                current = node.next;
            }
            if count > self.map.len() {
                panic!("cycle detected in recency list");
            }
        }

        debug_assert_eq!(count, self.map.len());
        debug_assert!(self.map.len() <= self.capacity);
    }
}

#[cfg(feature = "metrics")]
impl<K, V> BoundedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evictions: self.metrics.evictions,
            invalidate_calls: self.metrics.invalidate_calls,
            invalidated_entries: self.metrics.invalidated_entries,
            cache_len: self.map.len(),
            capacity: self.capacity,
        }
    }
}

impl<K, V> MemoCache<K, V> for BoundedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BoundedLruCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        BoundedLruCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        BoundedLruCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        BoundedLruCache::len(self)
    }

    #[inline]
    fn clear(&mut self) {
        BoundedLruCache::clear(self)
    }
}

impl<K, V> LruCacheTrait<K, V> for BoundedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn capacity(&self) -> usize {
        BoundedLruCache::capacity(self)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        BoundedLruCache::remove(self, key)
    }

    #[inline]
    fn invalidate<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        BoundedLruCache::invalidate(self, predicate)
    }

    #[inline]
    fn pop_lru(&mut self) -> Option<(K, V)> {
        BoundedLruCache::pop_lru(self)
    }

    #[inline]
    fn peek_lru(&self) -> Option<(&K, &V)> {
        BoundedLruCache::peek_lru(self)
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        BoundedLruCache::touch(self, key)
    }

    #[inline]
    fn recency_rank(&self, key: &K) -> Option<usize> {
        BoundedLruCache::recency_rank(self, key)
    }
}

impl<K, V> Drop for BoundedLruCache<K, V> {
    fn drop(&mut self) {
        // Free all nodes by walking the list; the map only holds pointers.
        let mut current = self.head;
        while let Some(node_ptr) = current {
            unsafe {
                let node = Box::from_raw(node_ptr.as_ptr());
                current = node.next;
            }
        }
    }
}

impl<K, V> fmt::Debug for BoundedLruCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedLruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

// SAFETY: the raw pointers only reference heap nodes owned by the struct.
unsafe impl<K: Send, V: Send> Send for BoundedLruCache<K, V> {}

// SAFETY: every `&self` method only reads through the node pointers; all
// list mutation requires `&mut self`. Needed so RwLock<Self> is Sync.
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for BoundedLruCache<K, V> {}

/// Thread-safe LRU cache wrapper with one coarse lock per instance.
///
/// `get` takes the write lock because a hit reorders the recency list;
/// `peek`, `contains` and the size accessors take the read lock.
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentLruCache<K, V> {
    inner: Arc<RwLock<BoundedLruCache<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates a new thread-safe LRU cache with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(RwLock::new(BoundedLruCache::try_new(capacity)?)),
        })
    }

    /// Creates a new thread-safe LRU cache with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BoundedLruCache::new(capacity))),
        }
    }

    /// Gets a value, promoting the entry to MRU. Takes the write lock.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.write();
        cache.get(key).cloned()
    }

    /// Peeks without reordering. Takes the read lock.
    pub fn peek(&self, key: &K) -> Option<V> {
        let cache = self.inner.read();
        cache.peek(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut cache = self.inner.write();
        cache.insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.write();
        cache.remove(key)
    }

    pub fn invalidate<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut cache = self.inner.write();
        cache.invalidate(predicate)
    }

    pub fn contains(&self, key: &K) -> bool {
        let cache = self.inner.read();
        cache.contains(key)
    }

    pub fn len(&self) -> usize {
        let cache = self.inner.read();
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        let cache = self.inner.read();
        cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        let cache = self.inner.read();
        cache.capacity()
    }

    pub fn clear(&self) {
        let mut cache = self.inner.write();
        cache.clear();
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.read();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// len() never exceeds capacity.
        #[test]
        fn prop_len_within_capacity(
            capacity in 1usize..64,
            ops in prop::collection::vec((0u32..128, 0i64..1000), 0..200)
        ) {
            let mut cache = BoundedLruCache::new(capacity);
            for (key, value) in ops {
                cache.insert(key, value);
                prop_assert!(cache.len() <= cache.capacity());
            }
        }

        /// Get after insert returns the value while the key is resident.
        #[test]
        fn prop_get_after_insert(
            capacity in 1usize..32,
            seed in prop::collection::vec(0u32..64, 0..64),
            key in 0u32..64,
            value in 0i64..1000,
        ) {
            let mut cache = BoundedLruCache::new(capacity);
            for k in seed {
                cache.insert(k, -1);
            }
            cache.insert(key, value);
            prop_assert_eq!(cache.get(&key), Some(&value));
            prop_assert_eq!(cache.recency_rank(&key), Some(0));
        }

        /// Invalidation removes exactly the matching keys.
        #[test]
        fn prop_invalidate_partitions_entries(
            capacity in 1usize..64,
            keys in prop::collection::vec(0u32..128, 0..64),
            threshold in 0u32..128,
        ) {
            let mut cache = BoundedLruCache::new(capacity);
            for k in &keys {
                cache.insert(*k, 0i64);
            }
            let resident: Vec<u32> = (0u32..128).filter(|k| cache.contains(k)).collect();
            let expected_removed =
                resident.iter().filter(|&&k| k < threshold).count();

            let removed = cache.invalidate(|&k| k < threshold);

            prop_assert_eq!(removed, expected_removed);
            for k in resident {
                prop_assert_eq!(cache.contains(&k), k >= threshold);
            }
        }
    }
}
