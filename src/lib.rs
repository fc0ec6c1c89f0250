//! Paygrade: salary recommendations from semantic job matching and multi-source
//! market data, served through a versioned single-flight cache.
//!
//! # Pipeline
//!
//! [`SalaryEngine::recommend`] fingerprints the request and consults the
//! [`VersionedCache`]. On a miss it runs:
//!
//! 1. [`JobMatcher`]: embed, nearest-neighbour search, optional LLM disambiguation.
//! 2. [`AggregationEngine`]: concurrent source queries, weighted percentile band.
//! 3. [`ConfidenceScorer`]: 0-100 score and level.
//!
//! The result is committed as the next version for the fingerprint and expires with the
//! shortest TTL among contributing sources.
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod aggregation;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod hashing;
pub mod market;
pub mod matching;
pub mod scoring;
pub mod storage;
pub mod vectordb;

pub use aggregation::{
    AggregateBand, AggregationConfig, AggregationEngine, AggregationError, PayPeriod,
    SalaryBand, SourceContribution,
};
pub use cache::{CacheConfig, CacheEntry, CacheStatus, VersionedCache};
pub use catalog::{Catalog, CatalogError};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{
    CachedEmbedder, Embedder, EmbeddingError, EmbeddingProvider, HashingEmbedder, RemoteEmbedder,
};
pub use engine::{
    EngineError, NoRecommendation, NoRecommendationReason, RecommendOutcome, RecommendRequest,
    RecommendationResult, SalaryEngine,
};
pub use hashing::{Fingerprint, hash_text, normalize_text};
pub use market::{
    LocationIndex, MarketDataError, MarketDataSource, PercentileSummary, SourceObservation,
    SourceProfile, StaticLocationIndex, StaticMarketSource,
};
pub use matching::{
    ChatDisambiguator, Disambiguator, JobMatcher, MatchError, MatchMethod, MatchOutcome,
    MatchResult, MatcherConfig,
};
pub use scoring::{ConfidenceConfig, ConfidenceLevel, ConfidenceScorer};
pub use storage::{FsVersionStore, InMemoryVersionStore, StorageError, VersionStore};
pub use vectordb::{
    InMemoryReferenceIndex, QdrantReferenceIndex, ReferenceIndex, ReferenceJob, VectorDbError,
};

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use market::MockMarketSource;
#[cfg(any(test, feature = "mock"))]
pub use matching::MockDisambiguator;
#[cfg(any(test, feature = "mock"))]
pub use storage::MockVersionStore;
