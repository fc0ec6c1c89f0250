//! JSON seed data: reference jobs, market sources and location multipliers.
//!
//! ```json
//! {
//!   "jobs": [{ "code": "ENG-SWE", "title": "Software Engineer", "family": "Engineering" }],
//!   "sources": [{
//!     "name": "survey", "priority": 1.0, "ttl_secs": 86400,
//!     "observations": [{ "code": "ENG-SWE", "location": "Singapore", "sample_size": 50,
//!       "recency_days": 5, "percentiles": { "p10": 1, "p25": 2, "p50": 3, "p75": 4, "p90": 5 } }]
//!   }],
//!   "locations": { "Singapore": 1.2 }
//! }
//! ```
//!
//! Jobs without an `embedding` are embedded through the configured provider when the
//! index is built.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::market::{
    MarketDataSource, PercentileSummary, SourceObservation, SourceProfile, StaticLocationIndex,
    StaticMarketSource,
};
use crate::matching::query_text;
use crate::vectordb::{InMemoryReferenceIndex, ReferenceJob, ReferenceJobRecord, VectorDbError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog: {reason}")]
    Invalid { reason: String },

    #[error("failed to embed reference job '{code}': {source}")]
    Embedding {
        code: String,
        #[source]
        source: EmbeddingError,
    },

    #[error(transparent)]
    Index(#[from] VectorDbError),
}

fn invalid(reason: impl Into<String>) -> CatalogError {
    CatalogError::Invalid {
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogJob {
    pub code: String,
    pub title: String,
    pub family: String,
    #[serde(default)]
    pub level: Option<String>,
    /// Extra text embedded with the title.
    #[serde(default)]
    pub description: String,
    /// Precomputed vector; skips the provider when present.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogObservation {
    pub code: String,
    /// Empty matches any location without a specific entry.
    #[serde(default)]
    pub location: String,
    pub sample_size: u64,
    pub recency_days: u32,
    pub percentiles: PercentileSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSource {
    pub name: String,
    pub priority: f64,
    pub ttl_secs: u64,
    #[serde(default)]
    pub freshness_window_days: Option<u32>,
    #[serde(default)]
    pub observations: Vec<CatalogObservation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub jobs: Vec<CatalogJob>,
    #[serde(default)]
    pub sources: Vec<CatalogSource>,
    #[serde(default)]
    pub locations: BTreeMap<String, f64>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let catalog = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            jobs = catalog.jobs.len(),
            sources = catalog.sources.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut codes = HashSet::new();
        for job in &self.jobs {
            if job.code.trim().is_empty() {
                return Err(invalid("job code cannot be empty"));
            }
            if !codes.insert(job.code.as_str()) {
                return Err(invalid(format!("duplicate job code '{}'", job.code)));
            }
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(invalid("source name cannot be empty"));
            }
            if !names.insert(source.name.as_str()) {
                return Err(invalid(format!("duplicate source '{}'", source.name)));
            }
            if !(source.priority.is_finite() && source.priority > 0.0) {
                return Err(invalid(format!(
                    "source '{}' priority must be positive",
                    source.name
                )));
            }
            if source.ttl_secs == 0 {
                return Err(invalid(format!("source '{}' ttl_secs must be > 0", source.name)));
            }
        }

        for (location, multiplier) in &self.locations {
            if !(multiplier.is_finite() && *multiplier > 0.0) {
                return Err(invalid(format!(
                    "location '{}' multiplier must be positive",
                    location
                )));
            }
        }
        Ok(())
    }

    /// Reference records, embedding jobs that carry no vector.
    pub async fn reference_records<E: EmbeddingProvider>(
        &self,
        embedder: &E,
    ) -> Result<Vec<ReferenceJobRecord>, CatalogError> {
        let mut records = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            let embedding = match &job.embedding {
                Some(vector) => vector.clone(),
                None => embedder
                    .embed(&query_text(&job.title, &job.description))
                    .await
                    .map_err(|source| CatalogError::Embedding {
                        code: job.code.clone(),
                        source,
                    })?,
            };

            let mut reference = ReferenceJob::new(&job.code, &job.title, &job.family);
            if let Some(level) = &job.level {
                reference = reference.with_level(level);
            }
            records.push(ReferenceJobRecord::new(reference, embedding));
        }
        debug!(records = records.len(), "Reference records prepared");
        Ok(records)
    }

    pub async fn build_index<E: EmbeddingProvider>(
        &self,
        embedder: &E,
    ) -> Result<InMemoryReferenceIndex, CatalogError> {
        let index = InMemoryReferenceIndex::new(embedder.dimension());
        index.insert_all(self.reference_records(embedder).await?)?;
        Ok(index)
    }

    pub fn market_sources(&self) -> Vec<Arc<dyn MarketDataSource>> {
        self.sources
            .iter()
            .map(|source| {
                let mut profile = SourceProfile::new(
                    &source.name,
                    source.priority,
                    Duration::from_secs(source.ttl_secs),
                );
                if let Some(days) = source.freshness_window_days {
                    profile = profile.with_freshness_window(days);
                }
                let mut market = StaticMarketSource::new(profile);
                for obs in &source.observations {
                    market.insert(
                        &obs.code,
                        &obs.location,
                        SourceObservation::new(obs.sample_size, obs.recency_days, obs.percentiles),
                    );
                }
                Arc::new(market) as Arc<dyn MarketDataSource>
            })
            .collect()
    }

    pub fn location_index(&self) -> StaticLocationIndex {
        let mut index = StaticLocationIndex::new();
        for (location, multiplier) in &self.locations {
            index.insert(location, *multiplier);
        }
        index
    }
}
