pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::memo::{Memoizer, Recurrence};
pub use crate::policy::lru::BoundedLruCache;
pub use crate::policy::splay::SplayCache;
pub use crate::traits::{LruCacheTrait, MemoCache};

#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::splay::ConcurrentSplayCache;

#[cfg(feature = "metrics")]
pub use crate::metrics::{LruMetricsSnapshot, SplayMetricsSnapshot};
