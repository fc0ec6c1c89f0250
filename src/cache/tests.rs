use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::{BoxFuture, join_all};

use super::*;
use crate::aggregation::{PayPeriod, SalaryBand, SourceContribution};
use crate::engine::{
    EngineError, NoRecommendation, NoRecommendationReason, RecommendOutcome, RecommendationResult,
};
use crate::hashing::Fingerprint;
use crate::market::PercentileSummary;
use crate::matching::{MatchMethod, MatchResult};
use crate::scoring::ConfidenceLevel;
use crate::storage::{InMemoryVersionStore, MockVersionStore};

const TTL: Duration = Duration::from_secs(3600);

fn sample_result() -> RecommendationResult {
    RecommendationResult {
        job_title: "Software Engineer".to_string(),
        location: "Singapore".to_string(),
        currency: "USD".to_string(),
        period: PayPeriod::Annual,
        salary_band: SalaryBand {
            target: 100.0,
            recommended_min: 90.0,
            recommended_max: 110.0,
            p10: 70.0,
            p25: 90.0,
            p50: 100.0,
            p75: 110.0,
            p90: 130.0,
        },
        confidence_score: 80.0,
        confidence_level: ConfidenceLevel::High,
        matched: None,
        source_contributions: Vec::new(),
        explanation: "test".to_string(),
        version: 0,
        calculated_at: Utc::now(),
        expires_at: Utc::now(),
    }
}

type ComputeFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<Computation, EngineError>> + Send>;

fn computing(calls: &Arc<AtomicUsize>, delay: Duration, ttl: Duration) -> ComputeFn {
    let calls = Arc::clone(calls);
    Box::new(move || {
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(Computation::Fresh {
                result: Box::new(sample_result()),
                ttl,
            })
        })
    })
}

fn failing(calls: &Arc<AtomicUsize>, delay: Duration) -> ComputeFn {
    let calls = Arc::clone(calls);
    Box::new(move || {
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Err(EngineError::EmbeddingUnavailable {
                reason: "provider down".to_string(),
            })
        })
    })
}

async fn exploding() -> Result<Computation, EngineError> {
    panic!("pipeline exploded")
}

fn fingerprint() -> Fingerprint {
    Fingerprint::compute("Software Engineer", "Singapore", "tenant-a")
}

fn version_of(outcome: &RecommendOutcome) -> u64 {
    outcome.recommendation().expect("recommendation").version
}

fn cache() -> VersionedCache<InMemoryVersionStore> {
    VersionedCache::new(InMemoryVersionStore::new(), CacheConfig::default())
}

#[tokio::test]
async fn test_miss_then_hit_returns_same_version() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let (first, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Computed);
    assert_eq!(version_of(&first), 1);

    let (second, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let entry = cache.entry(&fingerprint()).await.unwrap().unwrap();
    assert_eq!(entry.current_version, 1);
    assert!(entry.is_fresh(Utc::now()));
}

#[tokio::test]
async fn test_force_refresh_creates_next_version() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    let (forced, status) = cache
        .get_or_compute(fingerprint(), true, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Computed);
    assert_eq!(version_of(&forced), 2);

    let (after, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(version_of(&after), 2);
    assert_eq!(cache.versions(&fingerprint()).await.unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_concurrent_misses_compute_once() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let results = join_all((0..10).map(|_| {
        cache.get_or_compute(
            fingerprint(),
            false,
            computing(&calls, Duration::from_millis(50), TTL),
        )
    }))
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let mut computed = 0;
    for result in results {
        let (outcome, status) = result.unwrap();
        assert_eq!(version_of(&outcome), 1);
        match status {
            CacheStatus::Computed => computed += 1,
            CacheStatus::Joined => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(computed, 1);
    assert_eq!(cache.in_flight(), 0);
}

#[tokio::test]
async fn test_distinct_fingerprints_compute_independently() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let other = Fingerprint::compute("Software Engineer", "Singapore", "tenant-b");

    let (a, b) = tokio::join!(
        cache.get_or_compute(fingerprint(), false, computing(&calls, Duration::from_millis(20), TTL)),
        cache.get_or_compute(other, false, computing(&calls, Duration::from_millis(20), TTL)),
    );

    assert_eq!(a.unwrap().1, CacheStatus::Computed);
    assert_eq!(b.unwrap().1, CacheStatus::Computed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_is_shared_and_not_cached() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let results = join_all(
        (0..4).map(|_| cache.get_or_compute(fingerprint(), false, failing(&calls, Duration::from_millis(30)))),
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_retryable());
    }

    let (outcome, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Computed);
    assert_eq!(version_of(&outcome), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_recommendation_is_not_persisted() {
    let cache = cache();
    let none = NoRecommendation {
        job_title: "Zorblax Wrangler".to_string(),
        location: "Singapore".to_string(),
        reason: NoRecommendationReason::NoMatch,
        sources_attempted: Vec::new(),
        matched: None,
        message: "no match".to_string(),
    };

    let expected = none.clone();
    let (outcome, status) = cache
        .get_or_compute(fingerprint(), false, move || async move {
            Ok(Computation::Unavailable(none))
        })
        .await
        .unwrap();

    assert_eq!(status, CacheStatus::Uncached);
    assert_eq!(outcome, RecommendOutcome::NoRecommendation(expected));
    assert!(cache.entry(&fingerprint()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_entry_recomputes() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));
    let short = Duration::from_millis(30);

    cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, short))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    let (outcome, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, short))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Computed);
    assert_eq!(version_of(&outcome), 2);
}

#[tokio::test]
async fn test_abandoned_wait_still_commits() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(10),
        cache.get_or_compute(fingerprint(), false, computing(&calls, Duration::from_millis(80), TTL)),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(150)).await;

    let (outcome, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(version_of(&outcome), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_computation_releases_slot() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let err = cache
        .get_or_compute(fingerprint(), false, exploding)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Internal { .. }));
    assert_eq!(cache.in_flight(), 0);

    let (_, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Computed);
}

fn weighted_result(w: f64) -> RecommendationResult {
    let target = 80_000.0 + w * 40_000.0 / 3.0;
    let mut result = sample_result();
    result.salary_band = SalaryBand {
        target,
        recommended_min: target * 0.9,
        recommended_max: target * 1.1,
        p10: target * 0.7,
        p25: target * 0.9,
        p50: target,
        p75: target * 1.1,
        p90: target * 1.3,
    };
    result.confidence_score = 100.0 * w / 3.0;
    result.matched = Some(MatchResult {
        reference_code: "ENG-SWE".to_string(),
        reference_title: "Software Engineer".to_string(),
        reference_family: "Engineering".to_string(),
        reference_level: None,
        similarity_score: (w / 7.0) as f32,
        match_method: MatchMethod::VectorOnly,
        reasoning: None,
    });
    result.source_contributions = vec![
        SourceContribution {
            source_name: "survey".to_string(),
            sample_size: 50,
            recency_days: 5,
            weight_applied: w,
            observations: PercentileSummary::new(
                target * 0.7,
                target * 0.9,
                target,
                target * 1.1,
                target * 1.3,
            ),
        },
        SourceContribution {
            source_name: "job-board".to_string(),
            sample_size: 120,
            recency_days: 40,
            weight_applied: 1.0 - w,
            observations: PercentileSummary::new(
                target / 1.7,
                target / 1.3,
                target,
                target * 1.3,
                target * 1.7,
            ),
        },
    ];
    result
}

#[tokio::test]
async fn test_hit_is_bit_identical_to_computed_result() {
    let weights = (1..200u32)
        .map(|i| f64::from(i) / 199.0 * std::f64::consts::FRAC_1_SQRT_2)
        .chain([0.9556395672092627, 1.0 / 3.0, 0.1 + 0.2]);

    for w in weights {
        let cache = cache();
        let compute = move || async move {
            Ok(Computation::Fresh {
                result: Box::new(weighted_result(w)),
                ttl: TTL,
            })
        };

        let (first, status) = cache.get_or_compute(fingerprint(), false, compute).await.unwrap();
        assert_eq!(status, CacheStatus::Computed);

        let (second, status) = cache
            .get_or_compute(fingerprint(), false, || async {
                Err(EngineError::Internal {
                    reason: "must not recompute".to_string(),
                })
            })
            .await
            .unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(first, second, "w = {w}");

        let a = first.recommendation().unwrap();
        let b = second.recommendation().unwrap();
        assert_eq!(
            a.source_contributions[0].weight_applied.to_bits(),
            b.source_contributions[0].weight_applied.to_bits()
        );
        assert_eq!(
            a.salary_band.target.to_bits(),
            b.salary_band.target.to_bits()
        );
    }
}

#[tokio::test]
async fn test_store_write_failure_degrades_to_uncached() {
    let cache = VersionedCache::new(MockVersionStore::new(), CacheConfig::default());
    cache.store().set_fail_writes(true);
    let calls = Arc::new(AtomicUsize::new(0));

    let (outcome, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();

    assert_eq!(status, CacheStatus::Uncached);
    assert_eq!(version_of(&outcome), 1);

    cache.store().set_fail_writes(false);
    let (_, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Computed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_store_read_failure_still_answers() {
    let cache = VersionedCache::new(MockVersionStore::new(), CacheConfig::default());
    cache.store().set_fail_reads(true);
    let calls = Arc::new(AtomicUsize::new(0));

    let (outcome, status) = cache
        .get_or_compute(fingerprint(), false, computing(&calls, Duration::ZERO, TTL))
        .await
        .unwrap();

    assert_eq!(status, CacheStatus::Uncached);
    assert!(outcome.recommendation().is_some());
}

#[tokio::test]
async fn test_retention_keeps_newest_versions() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..7 {
        cache
            .get_or_compute(fingerprint(), true, computing(&calls, Duration::ZERO, TTL))
            .await
            .unwrap();
    }

    assert_eq!(cache.versions(&fingerprint()).await.unwrap(), vec![3, 4, 5, 6, 7]);
    let entry = cache.entry(&fingerprint()).await.unwrap().unwrap();
    assert_eq!(entry.current_version, 7);
}

#[tokio::test]
async fn test_forced_refresh_waits_for_running_flight() {
    let cache = cache();
    let calls = Arc::new(AtomicUsize::new(0));

    let (plain, forced) = tokio::join!(
        cache.get_or_compute(fingerprint(), false, computing(&calls, Duration::from_millis(40), TTL)),
        cache.get_or_compute(fingerprint(), true, computing(&calls, Duration::ZERO, TTL)),
    );

    let (plain, _) = plain.unwrap();
    let (forced, status) = forced.unwrap();
    assert_eq!(version_of(&plain), 1);
    assert_eq!(version_of(&forced), 2);
    assert_eq!(status, CacheStatus::Computed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_status_labels() {
    assert_eq!(CacheStatus::Hit.to_string(), "hit");
    assert_eq!(CacheStatus::Joined.as_str(), "joined");
    assert!(CacheStatus::Hit.is_hit());
    assert!(!CacheStatus::Uncached.is_hit());
}

#[test]
fn test_retention_is_at_least_one() {
    assert_eq!(CacheConfig::default().retention, 5);
    assert_eq!(CacheConfig::default().with_retention(0).retention, 1);
}
