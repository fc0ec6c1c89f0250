use std::sync::Arc;

use tracing::{info, instrument};

use super::error::EngineError;
use super::pipeline::Pipeline;
use super::types::{RecommendOutcome, RecommendRequest};
use crate::aggregation::AggregationEngine;
use crate::cache::{CacheStatus, VersionedCache};
use crate::embedding::EmbeddingProvider;
use crate::matching::JobMatcher;
use crate::scoring::ConfidenceScorer;
use crate::storage::VersionStore;
use crate::vectordb::ReferenceIndex;

/// Entry point: validates, consults the versioned cache, runs the pipeline on a miss.
pub struct SalaryEngine<E, I, S> {
    pipeline: Arc<Pipeline<E, I>>,
    cache: VersionedCache<S>,
}

impl<E, I, S> std::fmt::Debug for SalaryEngine<E, I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalaryEngine")
            .field("matcher", &self.pipeline.matcher)
            .field("aggregator", &self.pipeline.aggregator)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<E, I, S> SalaryEngine<E, I, S>
where
    E: EmbeddingProvider + 'static,
    I: ReferenceIndex + 'static,
    S: VersionStore + 'static,
{
    pub fn new(
        matcher: JobMatcher<E, I>,
        aggregator: AggregationEngine,
        scorer: ConfidenceScorer,
        cache: VersionedCache<S>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                matcher,
                aggregator,
                scorer,
            }),
            cache,
        }
    }

    pub fn matcher(&self) -> &JobMatcher<E, I> {
        &self.pipeline.matcher
    }

    pub fn aggregator(&self) -> &AggregationEngine {
        &self.pipeline.aggregator
    }

    pub fn cache(&self) -> &VersionedCache<S> {
        &self.cache
    }

    pub async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<RecommendOutcome, EngineError> {
        self.recommend_with_status(request)
            .await
            .map(|(outcome, _)| outcome)
    }

    /// Like [`recommend`](Self::recommend), also reporting how the cache served the call.
    #[instrument(skip(self, request), fields(title = %request.job_title, force = request.force_refresh))]
    pub async fn recommend_with_status(
        &self,
        request: &RecommendRequest,
    ) -> Result<(RecommendOutcome, CacheStatus), EngineError> {
        request.validate()?;

        let fingerprint = request.fingerprint();
        let query = request.query();
        let pipeline = Arc::clone(&self.pipeline);

        let (outcome, status) = self
            .cache
            .get_or_compute(fingerprint, request.force_refresh, move || async move {
                pipeline.run(query).await
            })
            .await?;

        match &outcome {
            RecommendOutcome::Recommendation(r) => info!(
                status = %status,
                version = r.version,
                confidence = r.confidence_score,
                "Recommendation served"
            ),
            RecommendOutcome::NoRecommendation(n) => info!(
                status = %status,
                reason = ?n.reason,
                "No recommendation available"
            ),
        }
        Ok((outcome, status))
    }
}
