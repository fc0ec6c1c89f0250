use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::constants::DEFAULT_VERSION_RETENTION;
use crate::engine::{NoRecommendation, RecommendationResult};
use crate::hashing::Fingerprint;
use crate::storage::StoredEntry;

/// How a call to [`VersionedCache::get_or_compute`](super::VersionedCache::get_or_compute)
/// was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Unexpired current version returned without recomputation.
    Hit,
    /// This call ran the computation and committed a new version.
    Computed,
    /// This call reused another caller's in-flight computation.
    Joined,
    /// Computed but not persisted (no recommendation, or the store failed).
    Uncached,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Computed => "computed",
            CacheStatus::Joined => "joined",
            CacheStatus::Uncached => "uncached",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to the current version of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub current_version: u64,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub(crate) fn from_stored(stored: &StoredEntry) -> Self {
        Self {
            fingerprint: Fingerprint::from_bytes(stored.fingerprint),
            current_version: stored.current_version,
            expires_at: DateTime::from_timestamp_millis(stored.expires_at)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub(crate) fn to_stored(self) -> StoredEntry {
        StoredEntry {
            fingerprint: *self.fingerprint.as_bytes(),
            current_version: self.current_version,
            expires_at: self.expires_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Versions kept per fingerprint (the current one is always kept).
    pub retention: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_VERSION_RETENTION,
        }
    }
}

impl CacheConfig {
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone)]
pub enum Computation {
    /// A result to version and persist for `ttl`.
    Fresh {
        result: Box<RecommendationResult>,
        ttl: Duration,
    },
    /// Shared with joined callers, never persisted.
    Unavailable(NoRecommendation),
}
