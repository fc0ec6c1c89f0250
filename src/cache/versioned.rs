use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use super::types::{CacheConfig, CacheEntry, CacheStatus, Computation};
use crate::engine::{EngineError, RecommendOutcome, RecommendationResult};
use crate::hashing::Fingerprint;
use crate::storage::{StorageError, StorageResult, StoredVersion, VersionStore};

type FlightOutput = Result<(RecommendOutcome, CacheStatus), EngineError>;
type FlightFuture = Shared<BoxFuture<'static, FlightOutput>>;

struct Flight {
    id: u64,
    forced: bool,
    future: FlightFuture,
}

type FlightMap = Arc<Mutex<HashMap<Fingerprint, Flight>>>;

/// Removes its flight from the map when the computation task ends, panics included.
struct FlightGuard {
    flights: FlightMap,
    fingerprint: Fingerprint,
    id: u64,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut flights = self.flights.lock();
        if flights
            .get(&self.fingerprint)
            .is_some_and(|f| f.id == self.id)
        {
            flights.remove(&self.fingerprint);
        }
    }
}

enum Slot {
    Join(FlightFuture),
    /// A non-forced flight is running; a forced caller waits for it, then starts its own.
    WaitThenRetry(FlightFuture),
    Lead(FlightFuture),
}

/// Fingerprint-keyed version history with at most one computation in flight per key.
pub struct VersionedCache<S> {
    store: Arc<S>,
    config: CacheConfig,
    flights: FlightMap,
    next_flight_id: AtomicU64,
}

impl<S> std::fmt::Debug for VersionedCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedCache")
            .field("config", &self.config)
            .field("in_flight", &self.flights.lock().len())
            .finish()
    }
}

impl<S: VersionStore + 'static> VersionedCache<S> {
    pub fn new(store: S, config: CacheConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    pub fn with_shared_store(store: Arc<S>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            flights: Arc::new(Mutex::new(HashMap::new())),
            next_flight_id: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }

    /// Current pointer for `fingerprint`, expired or not.
    pub async fn entry(&self, fingerprint: &Fingerprint) -> StorageResult<Option<CacheEntry>> {
        Ok(self
            .store
            .load_entry(fingerprint)
            .await?
            .map(|e| CacheEntry::from_stored(&e)))
    }

    /// Stored versions, ascending.
    pub async fn versions(&self, fingerprint: &Fingerprint) -> StorageResult<Vec<u64>> {
        self.store.list_versions(fingerprint).await
    }

    /// Returns the unexpired current version, or runs `compute` under single-flight.
    ///
    /// With `force_refresh` the cached version is ignored and a successful computation
    /// always commits a new version. Callers that drop the returned future do not cancel
    /// the computation.
    #[instrument(skip(self, fingerprint, compute), fields(fingerprint = %fingerprint.short()))]
    pub async fn get_or_compute<F, Fut>(
        &self,
        fingerprint: Fingerprint,
        force_refresh: bool,
        compute: F,
    ) -> Result<(RecommendOutcome, CacheStatus), EngineError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Computation, EngineError>> + Send + 'static,
    {
        if !force_refresh {
            match read_current(self.store.as_ref(), &fingerprint, Utc::now()).await {
                Ok(Some(result)) => {
                    info!(version = result.version, "Cache hit");
                    return Ok((RecommendOutcome::Recommendation(result), CacheStatus::Hit));
                }
                Ok(None) => debug!("Cache miss"),
                Err(e) => warn!(error = %e, "Cache read failed; computing"),
            }
        }

        let mut compute = Some(compute);
        loop {
            let slot = self.acquire(fingerprint, force_refresh, &mut compute);
            match slot {
                Slot::Join(future) => {
                    debug!("Joining in-flight computation");
                    let (outcome, _) = future.await?;
                    return Ok((outcome, CacheStatus::Joined));
                }
                Slot::WaitThenRetry(future) => {
                    debug!("Waiting for non-forced flight before refreshing");
                    let _ = future.await;
                }
                Slot::Lead(future) => return future.await,
            }
        }
    }

    fn acquire<F, Fut>(
        &self,
        fingerprint: Fingerprint,
        forced: bool,
        compute: &mut Option<F>,
    ) -> Slot
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Computation, EngineError>> + Send + 'static,
    {
        let mut flights = self.flights.lock();

        if let Some(flight) = flights.get(&fingerprint) {
            return if forced && !flight.forced {
                Slot::WaitThenRetry(flight.future.clone())
            } else {
                Slot::Join(flight.future.clone())
            };
        }

        let Some(compute) = compute.take() else {
            // The closure is only consumed when this caller leads, which returns.
            return Slot::Lead(
                futures_util::future::ready(Err(EngineError::Internal {
                    reason: "computation already consumed".to_string(),
                }))
                .boxed()
                .shared(),
            );
        };

        let id = self.next_flight_id.fetch_add(1, Ordering::Relaxed);
        let guard = FlightGuard {
            flights: Arc::clone(&self.flights),
            fingerprint,
            id,
        };
        let store = Arc::clone(&self.store);
        let retention = self.config.retention;

        let task = tokio::spawn(async move {
            let _guard = guard;
            run_flight(store.as_ref(), fingerprint, forced, retention, compute).await
        });

        let future = async move {
            match task.await {
                Ok(output) => output,
                Err(e) if e.is_panic() => Err(EngineError::Internal {
                    reason: "recommendation computation panicked".to_string(),
                }),
                Err(e) => Err(EngineError::Internal {
                    reason: format!("recommendation computation aborted: {}", e),
                }),
            }
        }
        .boxed()
        .shared();

        flights.insert(
            fingerprint,
            Flight {
                id,
                forced,
                future: future.clone(),
            },
        );
        Slot::Lead(future)
    }
}

async fn run_flight<S, F, Fut>(
    store: &S,
    fingerprint: Fingerprint,
    forced: bool,
    retention: usize,
    compute: F,
) -> FlightOutput
where
    S: VersionStore,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Computation, EngineError>>,
{
    if !forced {
        // Another flight may have committed between the caller's miss and this one.
        if let Ok(Some(result)) = read_current(store, &fingerprint, Utc::now()).await {
            return Ok((RecommendOutcome::Recommendation(result), CacheStatus::Hit));
        }
    }

    match compute().await? {
        Computation::Unavailable(none) => {
            debug!(reason = ?none.reason, "No recommendation; not caching");
            Ok((RecommendOutcome::NoRecommendation(none), CacheStatus::Uncached))
        }
        Computation::Fresh { result, ttl } => {
            commit(store, fingerprint, *result, ttl, retention).await
        }
    }
}

async fn commit<S: VersionStore>(
    store: &S,
    fingerprint: Fingerprint,
    mut result: RecommendationResult,
    ttl: Duration,
    retention: usize,
) -> FlightOutput {
    let now = Utc::now();
    result.calculated_at = now;
    result.expires_at = expiry(now, ttl);

    let current = match store.load_entry(&fingerprint).await {
        Ok(entry) => entry.map_or(0, |e| e.current_version),
        Err(e) => {
            warn!(error = %e, "Cannot read version pointer; returning uncached result");
            result.version = 1;
            return Ok((RecommendOutcome::Recommendation(result), CacheStatus::Uncached));
        }
    };
    result.version = current + 1;

    let (payload, result) = match encode(result) {
        Ok(encoded) => encoded,
        Err((result, e)) => {
            warn!(error = %e, version = result.version, "Encoding version failed; returning uncached result");
            return Ok((RecommendOutcome::Recommendation(result), CacheStatus::Uncached));
        }
    };

    if let Err(e) = persist(store, fingerprint, &result, payload).await {
        warn!(error = %e, version = result.version, "Persisting version failed; returning uncached result");
        return Ok((RecommendOutcome::Recommendation(result), CacheStatus::Uncached));
    }

    info!(version = result.version, expires_at = %result.expires_at, "Committed new version");

    if let Err(e) = prune(store, &fingerprint, result.version, retention).await {
        warn!(error = %e, "Pruning old versions failed");
    }

    Ok((RecommendOutcome::Recommendation(result), CacheStatus::Computed))
}

/// Serializes `result` and returns the payload with the value decoded from it, so the
/// committing caller sees exactly what later hits read back.
fn encode(
    result: RecommendationResult,
) -> Result<(Vec<u8>, RecommendationResult), (RecommendationResult, StorageError)> {
    let payload = match serde_json::to_vec(&result) {
        Ok(payload) => payload,
        Err(e) => return Err((result, StorageError::Serialization(e.to_string()))),
    };
    match serde_json::from_slice(&payload) {
        Ok(decoded) => Ok((payload, decoded)),
        Err(e) => Err((result, StorageError::Serialization(e.to_string()))),
    }
}

/// Writes the version, then moves the pointer to it.
async fn persist<S: VersionStore>(
    store: &S,
    fingerprint: Fingerprint,
    result: &RecommendationResult,
    payload: Vec<u8>,
) -> StorageResult<()> {
    store
        .save_version(StoredVersion {
            fingerprint: *fingerprint.as_bytes(),
            version: result.version,
            calculated_at: result.calculated_at.timestamp_millis(),
            expires_at: result.expires_at.timestamp_millis(),
            payload,
        })
        .await?;

    let entry = CacheEntry {
        fingerprint,
        current_version: result.version,
        expires_at: result.expires_at,
    };
    store.save_entry(entry.to_stored()).await
}

/// Deletes all but the `retention` newest versions; never the current one.
async fn prune<S: VersionStore>(
    store: &S,
    fingerprint: &Fingerprint,
    current_version: u64,
    retention: usize,
) -> StorageResult<usize> {
    let versions = store.list_versions(fingerprint).await?;
    let keep_from = versions.len().saturating_sub(retention.max(1));

    let mut removed = 0;
    for version in &versions[..keep_from] {
        if *version == current_version {
            continue;
        }
        store.delete_version(fingerprint, *version).await?;
        removed += 1;
    }

    if removed > 0 {
        debug!(removed, "Pruned old versions");
    }
    Ok(removed)
}

/// Unexpired current version, if any.
async fn read_current<S: VersionStore>(
    store: &S,
    fingerprint: &Fingerprint,
    now: DateTime<Utc>,
) -> StorageResult<Option<RecommendationResult>> {
    let Some(stored) = store.load_entry(fingerprint).await? else {
        return Ok(None);
    };
    let entry = CacheEntry::from_stored(&stored);
    if !entry.is_fresh(now) {
        debug!(version = entry.current_version, "Current version expired");
        return Ok(None);
    }

    let Some(version) = store.load_version(fingerprint, entry.current_version).await? else {
        return Ok(None);
    };

    serde_json::from_slice(&version.payload)
        .map(Some)
        .map_err(|e| StorageError::Corrupt {
            path: format!("{}/{}", fingerprint, entry.current_version),
            reason: e.to_string(),
        })
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
