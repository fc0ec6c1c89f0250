//! `paygrade <title> <location> [description...] [--refresh]`
//!
//! Builds an engine from `PAYGRADE_*` settings and prints the outcome as JSON.

use std::sync::Arc;

use mimalloc::MiMalloc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paygrade::aggregation::AggregationEngine;
use paygrade::cache::VersionedCache;
use paygrade::catalog::Catalog;
use paygrade::config::Config;
use paygrade::embedding::{CachedEmbedder, Embedder, EmbeddingProvider, HashingEmbedder, RemoteEmbedder};
use paygrade::engine::{RecommendRequest, SalaryEngine};
use paygrade::matching::{ChatDisambiguator, JobMatcher};
use paygrade::scoring::ConfidenceScorer;
use paygrade::storage::{FsVersionStore, InMemoryVersionStore, StoreBackend};
use paygrade::vectordb::{IndexBackend, QdrantReferenceIndex};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: paygrade <title> <location> [description...] [--refresh]";
const CLI_REQUESTER: &str = "cli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut refresh = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--refresh" => refresh = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => positional.push(arg),
        }
    }
    if positional.len() < 2 {
        anyhow::bail!(USAGE);
    }
    let description = positional[2..].join(" ");

    let config = Config::from_env()?;
    config.validate()?;

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => {
            warn!("No PAYGRADE_CATALOG_PATH configured, running with an empty catalog");
            Catalog::default()
        }
    };

    let embedder = CachedEmbedder::new(match config.remote_embedder() {
        Some(remote) => Embedder::Remote(RemoteEmbedder::new(remote)?),
        None => {
            warn!("No PAYGRADE_EMBEDDING_URL configured, using the offline hashing embedder");
            Embedder::Hashing(HashingEmbedder::new(config.embedding_dim))
        }
    });

    let index = match &config.qdrant_url {
        Some(url) => {
            let qdrant =
                QdrantReferenceIndex::new(url, &config.qdrant_collection, embedder.dimension())?;
            qdrant.health_check().await?;
            qdrant.ensure_collection().await?;
            qdrant.upsert(catalog.reference_records(&embedder).await?).await?;
            IndexBackend::Qdrant(qdrant)
        }
        None => IndexBackend::Memory(catalog.build_index(&embedder).await?),
    };

    let mut matcher = JobMatcher::new(embedder, index, config.matcher.clone())?;
    if let Some(llm) = config.disambiguator() {
        matcher = matcher.with_disambiguator(Arc::new(ChatDisambiguator::new(llm)?));
    }

    let aggregator = AggregationEngine::new(catalog.market_sources(), config.aggregation.clone())?
        .with_location_index(Arc::new(catalog.location_index()));

    let store = match &config.storage_path {
        Some(path) => StoreBackend::Fs(FsVersionStore::open(path)?),
        None => StoreBackend::Memory(InMemoryVersionStore::new()),
    };

    let engine = SalaryEngine::new(
        matcher,
        aggregator,
        ConfidenceScorer::default(),
        VersionedCache::new(store, config.cache.clone()),
    );

    let request = RecommendRequest::new(&positional[0], &positional[1], CLI_REQUESTER)
        .with_description(description)
        .force_refresh(refresh);

    let (outcome, status) = engine.recommend_with_status(&request).await?;
    info!(status = %status, "Request complete");

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
