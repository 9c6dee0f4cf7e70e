//! Splay-tree cache: a self-adjusting binary search tree for memoization.
//!
//! Every access moves the touched node to the root, so keys that are hit
//! repeatedly stay near the top of the tree. There is no structural balance
//! invariant; balance is only the amortized guarantee of the splay algorithm.
//!
//! ## Rotation patterns
//!
//! ```text
//!   Zig (parent is root)          Zig-zig (same side twice)
//!
//!        p                x              g                  x
//!       / \              / \            / \                  \
//!      x   c    ───►    a   p          p   d    ───►          p
//!     / \                  / \        / \                      \
//!    a   b                b   c      x   c                      g
//!                                   / \
//!                                  a   b
//!
//!   Zig-zag (opposite sides)
//!
//!        g                    x
//!       / \                 /   \
//!      p   d    ───►       p     g
//!     / \                 / \   / \
//!    a   x               a   b c   d
//!       / \
//!      b   c
//! ```
//!
//! ## Storage
//!
//! Nodes live in a [`NodeArena`] and reference each other by [`NodeId`];
//! rotations rewrite indices, never addresses. The tree in scope has no
//! delete operation, so the arena is append-only and `clear` is the only
//! deallocation point.
//!
//! ## Side effects
//!
//! Lookups restructure the tree, including misses (the last node visited on
//! the search path is splayed). `get` therefore takes `&mut self`; the
//! read-only probe is [`SplayCache::contains`], which descends without
//! splaying.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;

use crate::ds::{NodeArena, NodeId};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::SplayMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SplayMetricsSnapshot;
use crate::traits::MemoCache;

struct Node<K, V> {
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    key: K,
    value: V,
}

/// A self-adjusting binary search tree keyed by a totally ordered key.
///
/// After any successful `get` or any `insert`, the accessed key's node is the
/// root. No key ever occupies two nodes; re-inserting an existing key
/// overwrites its value in place.
///
/// # Example
///
/// ```
/// use memokit::policy::splay::SplayCache;
///
/// let mut cache = SplayCache::new();
/// cache.insert(5, "f5");
/// cache.insert(3, "f3");
/// cache.insert(8, "f8");
///
/// assert_eq!(cache.get(&3), Some(&"f3"));
/// assert_eq!(cache.root_key(), Some(&3));
/// ```
pub struct SplayCache<K, V> {
    arena: NodeArena<Node<K, V>>,
    root: Option<NodeId>,
    #[cfg(feature = "metrics")]
    metrics: SplayMetrics,
}

impl<K, V> SplayCache<K, V>
where
    K: Ord,
{
    /// Creates an empty splay cache. No capacity parameter: the tree is
    /// unbounded and grows with the number of distinct keys inserted.
    #[inline]
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
            #[cfg(feature = "metrics")]
            metrics: SplayMetrics::default(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        // No node is ever removed individually, so the arena length is the
        // entry count.
        self.arena.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns the key currently at the root, if any.
    ///
    /// After a `get` hit or an `insert`, this is the accessed key.
    #[inline]
    pub fn root_key(&self) -> Option<&K> {
        self.root.map(|id| &self.arena[id].key)
    }

    /// Read-only presence probe. Descends without splaying, so the tree
    /// shape and root are unchanged.
    pub fn contains(&self, key: &K) -> bool {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.arena[id];
            match key.cmp(&node.key) {
                Ordering::Equal => return true,
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        false
    }

    /// Looks up a key, splaying on both hit and miss.
    ///
    /// On a hit the node is splayed to the root and a reference to its value
    /// is returned. On a miss the last node visited along the search path is
    /// splayed, then `None` is returned; the key/value set is unchanged, only
    /// the shape.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let mut current = self.root;
        let mut last = None;
        while let Some(id) = current {
            last = Some(id);
            match key.cmp(&self.arena[id].key) {
                Ordering::Equal => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_search_hit();

                    self.splay(id);
                    return Some(&self.arena[id].value);
                }
                Ordering::Less => current = self.arena[id].left,
                Ordering::Greater => current = self.arena[id].right,
            }
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_search_miss();

        if let Some(id) = last {
            self.splay(id);
        }
        None
    }

    /// Inserts or overwrites a key, splaying the touched node to the root.
    ///
    /// Returns the previous value if the key already existed.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let Some(mut current) = self.root else {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_new();

            let id = self.arena.alloc(Node {
                parent: None,
                left: None,
                right: None,
                key,
                value,
            });
            self.root = Some(id);
            return None;
        };

        loop {
            match key.cmp(&self.arena[current].key) {
                Ordering::Equal => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_insert_update();

                    let previous = mem::replace(&mut self.arena[current].value, value);
                    self.splay(current);
                    return Some(previous);
                }
                Ordering::Less => match self.arena[current].left {
                    Some(next) => current = next,
                    None => {
                        let id = self.attach(current, key, value);
                        self.arena[current].left = Some(id);
                        self.splay(id);
                        return None;
                    }
                },
                Ordering::Greater => match self.arena[current].right {
                    Some(next) => current = next,
                    None => {
                        let id = self.attach(current, key, value);
                        self.arena[current].right = Some(id);
                        self.splay(id);
                        return None;
                    }
                },
            }
        }
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    fn attach(&mut self, parent: NodeId, key: K, value: V) -> NodeId {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        self.arena.alloc(Node {
            parent: Some(parent),
            left: None,
            right: None,
            key,
            value,
        })
    }

    /// Moves `x` to the root via zig / zig-zig / zig-zag rotations.
    fn splay(&mut self, x: NodeId) {
        while let Some(p) = self.arena[x].parent {
            let x_is_left = self.arena[p].left == Some(x);
            match self.arena[p].parent {
                // Zig: parent is root, single rotation.
                None => {
                    if x_is_left {
                        self.rotate_right(p);
                    } else {
                        self.rotate_left(p);
                    }
                }
                Some(g) => {
                    let p_is_left = self.arena[g].left == Some(p);
                    match (x_is_left, p_is_left) {
                        // Zig-zig: grandparent first, then parent.
                        (true, true) => {
                            self.rotate_right(g);
                            self.rotate_right(p);
                        }
                        (false, false) => {
                            self.rotate_left(g);
                            self.rotate_left(p);
                        }
                        // Zig-zag: parent first, opposite directions.
                        (true, false) => {
                            self.rotate_right(p);
                            self.rotate_left(g);
                        }
                        (false, true) => {
                            self.rotate_left(p);
                            self.rotate_right(g);
                        }
                    }
                }
            }
        }
    }

    /// Rotates `x`'s right child above `x`, preserving in-order sequence.
    ///
    /// No-op if `x` has no right child; `splay` only calls it when one exists.
    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.arena[x].right else {
            debug_assert!(false, "rotate_left requires a right child");
            return;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_rotation();

        let inner = self.arena[y].left;
        self.arena[x].right = inner;
        if let Some(child) = inner {
            self.arena[child].parent = Some(x);
        }

        let x_parent = self.arena[x].parent;
        self.arena[y].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.arena[p].left == Some(x) {
                    self.arena[p].left = Some(y);
                } else {
                    self.arena[p].right = Some(y);
                }
            }
        }

        self.arena[y].left = Some(x);
        self.arena[x].parent = Some(y);
    }

    /// Rotates `x`'s left child above `x`, preserving in-order sequence.
    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.arena[x].left else {
            debug_assert!(false, "rotate_right requires a left child");
            return;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_rotation();

        let inner = self.arena[y].right;
        self.arena[x].left = inner;
        if let Some(child) = inner {
            self.arena[child].parent = Some(x);
        }

        let x_parent = self.arena[x].parent;
        self.arena[y].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.arena[p].left == Some(x) {
                    self.arena[p].left = Some(y);
                } else {
                    self.arena[p].right = Some(y);
                }
            }
        }

        self.arena[y].right = Some(x);
        self.arena[x].parent = Some(y);
    }

    /// Validates the tree structure.
    ///
    /// Checks that an in-order traversal yields strictly increasing keys,
    /// that parent/child links are mutually consistent, and that every arena
    /// node is reachable from the root. Intended for tests and debugging;
    /// operations maintain these invariants unconditionally.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let Some(root) = self.root else {
            return if self.arena.is_empty() {
                Ok(())
            } else {
                Err(InvariantError::new("empty root with non-empty arena"))
            };
        };

        if self.arena[root].parent.is_some() {
            return Err(InvariantError::new("root node has a parent link"));
        }

        let mut stack = Vec::new();
        let mut current = Some(root);
        let mut visited = 0usize;
        let mut prev_key: Option<&K> = None;

        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                let node = &self.arena[id];
                for child in [node.left, node.right].into_iter().flatten() {
                    if self.arena[child].parent != Some(id) {
                        return Err(InvariantError::new(
                            "child's parent link does not match its parent",
                        ));
                    }
                }
                stack.push(id);
                if stack.len() > self.arena.len() {
                    return Err(InvariantError::new("cycle detected in tree"));
                }
                current = node.left;
            }

            let id = match stack.pop() {
                Some(id) => id,
                None => break,
            };
            visited += 1;
            if visited > self.arena.len() {
                return Err(InvariantError::new("cycle detected in tree"));
            }

            let node = &self.arena[id];
            if let Some(prev) = prev_key {
                if prev >= &node.key {
                    return Err(InvariantError::new(
                        "in-order keys not strictly increasing",
                    ));
                }
            }
            prev_key = Some(&node.key);
            current = node.right;
        }

        if visited != self.arena.len() {
            return Err(InvariantError::new("arena holds nodes unreachable from root"));
        }
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> SplayCache<K, V>
where
    K: Ord,
{
    pub fn metrics_snapshot(&self) -> SplayMetricsSnapshot {
        SplayMetricsSnapshot {
            search_calls: self.metrics.search_calls,
            search_hits: self.metrics.search_hits,
            search_misses: self.metrics.search_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            rotations: self.metrics.rotations,
            cache_len: self.len(),
        }
    }
}

impl<K, V> MemoCache<K, V> for SplayCache<K, V>
where
    K: Ord,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        SplayCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        SplayCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        SplayCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        SplayCache::len(self)
    }

    #[inline]
    fn clear(&mut self) {
        SplayCache::clear(self)
    }
}

impl<K, V> Default for SplayCache<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SplayCache<K, V>
where
    K: Ord + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplayCache")
            .field("len", &self.len())
            .field("root_key", &self.root_key())
            .finish_non_exhaustive()
    }
}

/// Thread-safe splay cache wrapper with one coarse lock per instance.
///
/// Lookups splay, so `get` takes the write lock; fine-grained or read-locked
/// access is unsound here because reads mutate shared structure.
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentSplayCache<K, V> {
    inner: Arc<RwLock<SplayCache<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentSplayCache<K, V>
where
    K: Ord + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SplayCache::new())),
        }
    }

    /// Looks up a key, splaying the tree. Takes the write lock.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.write();
        cache.get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut cache = self.inner.write();
        cache.insert(key, value)
    }

    /// Presence probe without splaying. Takes the read lock.
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

    pub fn root_key(&self) -> Option<K>
    where
        K: Clone,
    {
        let cache = self.inner.read();
        cache.root_key().cloned()
    }

    pub fn clear(&self) {
        let mut cache = self.inner.write();
        cache.clear();
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> Default for ConcurrentSplayCache<K, V>
where
    K: Ord + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentSplayCache<K, V>
where
    K: Ord + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.read();
        f.debug_struct("ConcurrentSplayCache")
            .field("len", &cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_returns_value() {
        let mut cache = SplayCache::new();
        cache.insert(1, "one");

        assert_eq!(cache.get(&1), Some(&"one"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn accessed_key_becomes_root() {
        let mut cache = SplayCache::new();
        cache.insert(5, "f5");
        cache.insert(3, "f3");
        cache.insert(8, "f8");

        assert_eq!(cache.root_key(), Some(&8));

        assert_eq!(cache.get(&3), Some(&"f3"));
        assert_eq!(cache.root_key(), Some(&3));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn insert_existing_overwrites_and_splays() {
        let mut cache = SplayCache::new();
        cache.insert(1, "one");
        cache.insert(2, "two");

        let old = cache.insert(1, "ONE");
        assert_eq!(old, Some("one"));
        assert_eq!(cache.root_key(), Some(&1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some(&"ONE"));
    }

    #[test]
    fn miss_splays_last_visited_without_mutation() {
        let mut cache = SplayCache::new();
        cache.insert(10, "a");
        cache.insert(5, "b");
        cache.insert(15, "c");
        // Shape after the zig-zig splay of 15: root 15, left 10, 10.left 5.

        assert_eq!(cache.get(&12), None);

        // The search for 12 ends at node 10; that node is splayed.
        assert_eq!(cache.root_key(), Some(&10));
        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&5));
        assert!(cache.contains(&10));
        assert!(cache.contains(&15));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn contains_does_not_change_root() {
        let mut cache = SplayCache::new();
        cache.insert(2, "b");
        cache.insert(1, "a");
        cache.insert(3, "c");

        let root_before = cache.root_key().copied();
        assert!(cache.contains(&1));
        assert!(!cache.contains(&9));
        assert_eq!(cache.root_key().copied(), root_before);
    }

    #[test]
    fn zig_zig_on_ascending_chain() {
        let mut cache = SplayCache::new();
        for key in 1..=6 {
            cache.insert(key, key * 10);
        }
        assert_eq!(cache.root_key(), Some(&6));

        // Deepest key: the access path is all-left, exercising zig-zig.
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.root_key(), Some(&1));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn zig_zag_access() {
        let mut cache = SplayCache::new();
        cache.insert(10, "a");
        cache.insert(20, "b");
        cache.insert(5, "c");
        cache.insert(7, "d");

        assert_eq!(cache.get(&20), Some(&"b"));
        assert_eq!(cache.root_key(), Some(&20));
        cache.check_invariants().unwrap();

        for key in [5, 7, 10, 20] {
            assert!(cache.contains(&key));
        }
    }

    #[test]
    fn values_survive_heavy_restructuring() {
        let mut cache = SplayCache::new();
        for key in 0..64 {
            cache.insert(key, key * 2);
        }
        // Interleave hits and misses from both ends.
        for key in (0..64).rev() {
            assert_eq!(cache.get(&key), Some(&(key * 2)));
            assert_eq!(cache.root_key(), Some(&key));
        }
        assert_eq!(cache.get(&1000), None);
        assert_eq!(cache.len(), 64);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn clear_empties_tree() {
        let mut cache = SplayCache::new();
        cache.insert(1, "one");
        cache.insert(2, "two");

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.root_key(), None);
        assert_eq!(cache.get(&1), None);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn empty_tree_get_is_noop() {
        let mut cache: SplayCache<i32, i32> = SplayCache::new();
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
        cache.check_invariants().unwrap();
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn concurrent_wrapper_basic_ops() {
        let cache = ConcurrentSplayCache::new();
        cache.insert(1, "one");
        cache.insert(2, "two");

        assert_eq!(cache.get(&1), Some("one"));
        assert_eq!(cache.root_key(), Some(1));
        assert!(cache.contains(&2));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
