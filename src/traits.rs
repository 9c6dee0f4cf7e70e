//! Cache trait hierarchy for the memoization backends.
//!
//! ```text
//!          ┌──────────────────────────────────────┐
//!          │           MemoCache<K, V>            │
//!          │                                      │
//!          │  insert(&mut, K, V) → Option<V>      │
//!          │  get(&mut, &K) → Option<&V>          │
//!          │  contains(&, &K) → bool              │
//!          │  len / is_empty / clear              │
//!          └──────────────────┬───────────────────┘
//!                             │
//!                             ▼
//!          ┌──────────────────────────────────────┐
//!          │         LruCacheTrait<K, V>          │
//!          │                                      │
//!          │  capacity(&) → usize                 │
//!          │  remove(&mut, &K) → Option<V>        │
//!          │  invalidate(&mut, pred) → usize      │
//!          │  pop_lru / peek_lru / touch          │
//!          │  recency_rank(&, &K) → usize         │
//!          └──────────────────────────────────────┘
//! ```
//!
//! [`MemoCache`] is the contract the memoized-recursion layer needs and both
//! backends satisfy: point lookup, insert-or-overwrite, and a handful of size
//! accessors. `get` takes `&mut self` on purpose — both backends reorganize
//! internal layout on a hit (splay restructuring, recency promotion), so even
//! pure reads are mutations.
//!
//! [`LruCacheTrait`] adds the bounded-cache surface: capacity, eviction
//! inspection, and predicate-based bulk invalidation. The splay tree does not
//! implement it; deletion and capacity bounds are out of its scope.

/// Operations the memoization contract needs from any backend.
pub trait MemoCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key
    /// existed. Bounded implementations may evict another entry first.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// Takes `&mut self`: a hit reorganizes the backend's internal layout.
    /// A miss never changes the stored key/value set.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns `true` if the key is present. Never reorganizes.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    fn clear(&mut self);
}

/// Recency-tracking operations of the bounded LRU backend.
pub trait LruCacheTrait<K, V>: MemoCache<K, V> {
    /// Returns the maximum capacity.
    fn capacity(&self) -> usize;

    /// Removes a single key, returning its value.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes every entry whose key satisfies `predicate`, irrespective of
    /// recency position. Returns the number of entries removed. O(len).
    fn invalidate<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&K) -> bool;

    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Peeks at the least recently used entry without removing it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Promotes an entry to MRU without returning its value.
    fn touch(&mut self, key: &K) -> bool;

    /// Returns the entry's position in recency order, 0 = MRU. O(len).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}
