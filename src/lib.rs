//! memokit: self-adjusting caches for memoizing expensive recomputation.
//!
//! Two independent backends with no shared state:
//!
//! - [`policy::splay::SplayCache`] — a splay-tree key-value cache that
//!   reorganizes itself on every access, keeping recently touched keys near
//!   the root.
//! - [`policy::lru::BoundedLruCache`] — a fixed-capacity cache with
//!   least-recently-used eviction and predicate-based bulk invalidation.
//!
//! Both are driven identically through [`traits::MemoCache`], and
//! [`memo::Memoizer`] layers the memoized-recursion contract on top of
//! either. See `demos/` for end-to-end usage.

pub mod builder;
pub mod ds;
pub mod error;
pub mod memo;
pub mod policy;
pub mod prelude;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;
