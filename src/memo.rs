//! Memoized recursive composition over any [`MemoCache`] backend.
//!
//! The contract: consult the cache first; on a hit return the cached value
//! without recursing; on a miss recursively compute the dependent values
//! (each consulting and populating the same cache), combine them, insert the
//! result, return it. Both backends support this pattern unchanged — the
//! only observable difference is which keys remain cheap to re-access after
//! heavy interleaved use (root proximity vs MRU rank).
//!
//! The cache is explicit, caller-owned state held by the [`Memoizer`], never
//! a process-wide global. That keeps test runs isolated and allows
//! independent memoization sessions side by side.
//!
//! ## Example
//!
//! ```
//! use memokit::memo::{Memoizer, Recurrence};
//! use memokit::policy::splay::SplayCache;
//!
//! struct Fibonacci;
//!
//! impl Recurrence<u64, u64> for Fibonacci {
//!     fn base(&self, key: &u64) -> Option<u64> {
//!         (*key < 2).then_some(*key)
//!     }
//!
//!     fn dependencies(&self, key: &u64) -> Vec<u64> {
//!         vec![key - 1, key - 2]
//!     }
//!
//!     fn combine(&self, _key: &u64, deps: &[u64]) -> u64 {
//!         deps.iter().sum()
//!     }
//! }
//!
//! let mut memo = Memoizer::new(SplayCache::new(), Fibonacci);
//! assert_eq!(memo.compute(10), 55);
//! assert_eq!(memo.cache().len(), 11); // keys 0..=10
//! ```

use crate::traits::MemoCache;

/// A recursively defined computation: a base case plus a combination rule
/// over smaller keys.
pub trait Recurrence<K, V> {
    /// Returns the value directly if `key` is a base case, short-circuiting
    /// recursion.
    fn base(&self, key: &K) -> Option<V>;

    /// Returns the keys this key's value depends on. Only called when
    /// [`base`](Self::base) returned `None`.
    fn dependencies(&self, key: &K) -> Vec<K>;

    /// Combines dependency values, in [`dependencies`](Self::dependencies)
    /// order, into this key's value.
    fn combine(&self, key: &K, deps: &[V]) -> V;
}

/// Drives a [`Recurrence`] through a caller-supplied cache.
pub struct Memoizer<C, R> {
    cache: C,
    rule: R,
}

impl<C, R> Memoizer<C, R> {
    /// Creates a memoizer over the given cache and rule. The cache may
    /// already be warm; existing entries are trusted.
    pub fn new(cache: C, rule: R) -> Self {
        Self { cache, rule }
    }

    /// Read access to the underlying cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Mutable access to the underlying cache, e.g. for invalidation after
    /// an external mutation.
    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    /// Consumes the memoizer, returning the cache.
    pub fn into_cache(self) -> C {
        self.cache
    }
}

impl<C, R> Memoizer<C, R> {
    /// Computes the value for `key`, memoizing every intermediate result.
    ///
    /// Recursion depth follows the dependency chain; the cache bounds the
    /// amount of recomputation, not the depth.
    pub fn compute<K, V>(&mut self, key: K) -> V
    where
        K: Clone,
        V: Clone,
        C: MemoCache<K, V>,
        R: Recurrence<K, V>,
    {
        if let Some(value) = self.cache.get(&key) {
            return value.clone();
        }

        let value = match self.rule.base(&key) {
            Some(value) => value,
            None => {
                let deps = self.rule.dependencies(&key);
                let resolved: Vec<V> = deps.into_iter().map(|dep| self.compute(dep)).collect();
                self.rule.combine(&key, &resolved)
            }
        };

        self.cache.insert(key, value.clone());
        value
    }
}
