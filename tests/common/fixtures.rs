//! Shared engine fixtures for integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use paygrade::aggregation::{AggregationConfig, AggregationEngine};
use paygrade::cache::{CacheConfig, VersionedCache};
use paygrade::catalog::Catalog;
use paygrade::embedding::MockEmbedder;
use paygrade::engine::{RecommendRequest, SalaryEngine};
use paygrade::matching::{JobMatcher, MatcherConfig};
use paygrade::scoring::ConfidenceScorer;
use paygrade::storage::VersionStore;
use paygrade::vectordb::InMemoryReferenceIndex;

pub const DIMENSION: usize = 4;

pub const REQUESTER: &str = "tenant-a";

pub type FixtureEngine<S> = SalaryEngine<Arc<MockEmbedder>, InMemoryReferenceIndex, S>;

pub fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

pub fn catalog() -> Catalog {
    Catalog::from_path(catalog_path()).expect("fixture catalog should load")
}

/// Query vectors for the fixture titles; anything else fails to embed.
pub fn embedder() -> MockEmbedder {
    MockEmbedder::new(DIMENSION)
        .with_vector(
            "Software Engineer Python backend developer",
            vec![1.0, 0.0, 0.0, 0.0],
        )
        .with_vector("Software Engineer", vec![1.0, 0.0, 0.0, 0.0])
        .with_vector("Data Engineer", vec![0.6, 0.8, 0.0, 0.0])
        .with_vector("Accountant", vec![0.0, 0.0, 1.0, 0.0])
        .with_vector("Zorblax Wrangler", vec![0.0, 0.0, 0.0, 1.0])
}

pub async fn engine<S: VersionStore + 'static>(
    embedder: Arc<MockEmbedder>,
    store: S,
) -> FixtureEngine<S> {
    engine_with_cache(embedder, store, CacheConfig::default()).await
}

pub async fn engine_with_cache<S: VersionStore + 'static>(
    embedder: Arc<MockEmbedder>,
    store: S,
    cache: CacheConfig,
) -> FixtureEngine<S> {
    let catalog = catalog();
    let index = catalog
        .build_index(&embedder)
        .await
        .expect("fixture index should build");

    let matcher = JobMatcher::new(
        embedder,
        index,
        MatcherConfig::default().with_retries(1, Duration::from_millis(1)),
    )
    .expect("fixture matcher");

    let aggregator = AggregationEngine::new(catalog.market_sources(), AggregationConfig::default())
        .expect("fixture aggregator")
        .with_location_index(Arc::new(catalog.location_index()));

    SalaryEngine::new(
        matcher,
        aggregator,
        ConfidenceScorer::default(),
        VersionedCache::new(store, cache),
    )
}

pub fn swe_request() -> RecommendRequest {
    RecommendRequest::new("Software Engineer", "Singapore", REQUESTER)
        .with_description("Python backend developer")
}
