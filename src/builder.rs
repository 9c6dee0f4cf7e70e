//! Unified cache builder over both memoization backends.
//!
//! Hides the policy choice behind enum dispatch so callers (most importantly
//! the [`Memoizer`](crate::memo::Memoizer)) run unchanged over either
//! backend.
//!
//! ## Example
//!
//! ```
//! use memokit::builder::{CacheBuilder, CachePolicy};
//! use memokit::traits::MemoCache;
//!
//! let mut cache = CacheBuilder::new(CachePolicy::Lru { capacity: 100 })
//!     .build::<u64, String>();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::lru::BoundedLruCache;
use crate::policy::splay::SplayCache;
use crate::traits::MemoCache;

/// Available memoization backends.
#[derive(Debug, Clone)]
pub enum CachePolicy {
    /// Self-adjusting splay tree, unbounded. Recently touched keys stay near
    /// the root.
    Splay,
    /// Bounded cache with least-recently-used eviction.
    Lru { capacity: usize },
}

/// Unified cache wrapper with a consistent API regardless of policy.
pub struct Cache<K, V>
where
    K: Ord + Eq + Hash + Clone,
{
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V>
where
    K: Ord + Eq + Hash + Clone,
{
    Splay(SplayCache<K, V>),
    Lru(BoundedLruCache<K, V>),
}

impl<K, V> MemoCache<K, V> for Cache<K, V>
where
    K: Ord + Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::Splay(splay) => splay.insert(key, value),
            CacheInner::Lru(lru) => lru.insert(key, value),
        }
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::Splay(splay) => splay.get(key),
            CacheInner::Lru(lru) => lru.get(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Splay(splay) => splay.contains(key),
            CacheInner::Lru(lru) => lru.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Splay(splay) => splay.len(),
            CacheInner::Lru(lru) => lru.len(),
        }
    }

    fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Splay(splay) => splay.clear(),
            CacheInner::Lru(lru) => lru.clear(),
        }
    }
}

/// Builder for creating cache instances.
pub struct CacheBuilder {
    policy: CachePolicy,
}

impl CacheBuilder {
    /// Creates a builder for the given policy.
    pub fn new(policy: CachePolicy) -> Self {
        Self { policy }
    }

    /// Builds a cache with the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the policy configuration is invalid
    /// (zero LRU capacity).
    pub fn try_build<K, V>(self) -> Result<Cache<K, V>, ConfigError>
    where
        K: Ord + Eq + Hash + Clone,
    {
        let inner = match self.policy {
            CachePolicy::Splay => CacheInner::Splay(SplayCache::new()),
            CachePolicy::Lru { capacity } => {
                CacheInner::Lru(BoundedLruCache::try_new(capacity)?)
            }
        };
        Ok(Cache { inner })
    }

    /// Builds a cache with the configured policy.
    ///
    /// # Panics
    ///
    /// Panics if the policy configuration is invalid. See
    /// [`try_build`](Self::try_build).
    pub fn build<K, V>(self) -> Cache<K, V>
    where
        K: Ord + Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_policies_basic_ops() {
        let policies = [CachePolicy::Splay, CachePolicy::Lru { capacity: 10 }];

        for policy in policies {
            let mut cache = CacheBuilder::new(policy.clone()).build::<u64, String>();

            assert_eq!(cache.insert(1, "one".to_string()), None);
            assert_eq!(cache.insert(2, "two".to_string()), None);

            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.get(&2), Some(&"two".to_string()));
            assert_eq!(cache.get(&3), None);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));

            assert_eq!(cache.len(), 2);
            assert!(!cache.is_empty());

            assert_eq!(cache.insert(1, "ONE".to_string()), Some("one".to_string()));
            assert_eq!(cache.get(&1), Some(&"ONE".to_string()));

            cache.clear();
            assert!(cache.is_empty(), "clear failed for {policy:?}");
        }
    }

    #[test]
    fn lru_policy_enforces_capacity() {
        let mut cache = CacheBuilder::new(CachePolicy::Lru { capacity: 2 }).build::<u64, i64>();

        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(3, 30); // evicts key 1

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn splay_policy_is_unbounded() {
        let mut cache = CacheBuilder::new(CachePolicy::Splay).build::<u64, i64>();
        for key in 0..1000 {
            cache.insert(key, 0);
        }
        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn zero_capacity_lru_is_rejected() {
        let result = CacheBuilder::new(CachePolicy::Lru { capacity: 0 }).try_build::<u64, i64>();
        assert!(result.is_err());
    }
}
