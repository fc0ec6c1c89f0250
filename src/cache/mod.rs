//! Versioned recommendation cache.
//!
//! Per fingerprint: `no entry -> v1 -> v2 -> ...`. A hit serves the current version while
//! `now < expires_at`; otherwise one computation runs (concurrent callers join it) and its
//! result is committed as `current + 1`. Only the newest `retention` versions are kept.

pub mod types;
pub mod versioned;

#[cfg(test)]
mod tests;

pub use types::{CacheConfig, CacheEntry, CacheStatus, Computation};
pub use versioned::VersionedCache;
