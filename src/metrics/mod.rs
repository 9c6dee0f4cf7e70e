//! Feature-gated operation counters for the cache backends.
//!
//! Counters are recorded inline in the hot paths behind
//! `#[cfg(feature = "metrics")]` and read out through plain-old-data
//! snapshot structs, so the zero-feature build carries no bookkeeping.

pub mod metrics_impl;
pub mod snapshot;

pub use snapshot::{LruMetricsSnapshot, SplayMetricsSnapshot};
