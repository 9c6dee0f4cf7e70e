pub mod lru;
pub mod splay;

pub use lru::BoundedLruCache;
#[cfg(feature = "concurrency")]
pub use lru::ConcurrentLruCache;
pub use splay::SplayCache;
#[cfg(feature = "concurrency")]
pub use splay::ConcurrentSplayCache;
