use chrono::Utc;
use tracing::{debug, info, instrument};

use super::error::EngineError;
use super::types::{JobQuery, NoRecommendation, NoRecommendationReason, RecommendationResult};
use crate::aggregation::{AggregateBand, AggregationConfig, AggregationEngine, AggregationError};
use crate::cache::Computation;
use crate::embedding::EmbeddingProvider;
use crate::matching::{JobMatcher, MatchOutcome, MatchResult};
use crate::scoring::{ConfidenceAssessment, ConfidenceScorer};
use crate::vectordb::ReferenceIndex;

/// Matcher, aggregation and scoring run as one uncached computation.
pub(crate) struct Pipeline<E, I> {
    pub(crate) matcher: JobMatcher<E, I>,
    pub(crate) aggregator: AggregationEngine,
    pub(crate) scorer: ConfidenceScorer,
}

impl<E: EmbeddingProvider, I: ReferenceIndex> Pipeline<E, I> {
    #[instrument(skip(self, query), fields(title = %query.title))]
    pub(crate) async fn run(&self, query: JobQuery) -> Result<Computation, EngineError> {
        let outcome = self
            .matcher
            .match_job(&query.title, &query.description, query.family_hint.as_deref())
            .await?;

        let matched = match outcome {
            MatchOutcome::Matched(m) => m,
            MatchOutcome::NotFound(reason) => {
                info!(%reason, "No reference job matched");
                return Ok(Computation::Unavailable(NoRecommendation {
                    job_title: query.title,
                    location: query.location,
                    reason: NoRecommendationReason::NoMatch,
                    sources_attempted: Vec::new(),
                    matched: None,
                    message: format!("no reference job matched: {}", reason),
                }));
            }
        };

        let aggregate = match self
            .aggregator
            .aggregate(&matched.reference_code, &query.location)
            .await
        {
            Ok(aggregate) => aggregate,
            Err(AggregationError::InsufficientData { sources_attempted }) => {
                info!(code = %matched.reference_code, "No market data for matched job");
                let message = format!(
                    "no market data for {} in '{}' from {} source(s)",
                    matched.reference_code,
                    query.location,
                    sources_attempted.len()
                );
                return Ok(Computation::Unavailable(NoRecommendation {
                    job_title: query.title,
                    location: query.location,
                    reason: NoRecommendationReason::NoMarketData,
                    sources_attempted,
                    matched: Some(matched),
                    message,
                }));
            }
            Err(e) => return Err(e.into()),
        };

        let assessment = self.scorer.score(
            Some(&matched),
            &aggregate.contributions,
            query.completeness(),
        );
        debug!(
            score = assessment.score,
            level = ?assessment.level,
            "Recommendation scored"
        );

        let explanation = explain(&matched, &aggregate, assessment, self.aggregator.config());
        let ttl = aggregate.min_ttl;
        let config = self.aggregator.config();
        let now = Utc::now();

        let result = RecommendationResult {
            job_title: query.title,
            location: query.location,
            currency: config.currency.clone(),
            period: config.period,
            salary_band: aggregate.band,
            confidence_score: assessment.score,
            confidence_level: assessment.level,
            matched: Some(matched),
            source_contributions: aggregate.contributions,
            explanation,
            // Stamped by the cache on commit.
            version: 0,
            calculated_at: now,
            expires_at: now,
        };

        Ok(Computation::Fresh {
            result: Box::new(result),
            ttl,
        })
    }
}

fn explain(
    matched: &MatchResult,
    aggregate: &AggregateBand,
    assessment: ConfidenceAssessment,
    config: &AggregationConfig,
) -> String {
    let mut text = format!(
        "Matched to {} '{}' ({}, similarity {:.2}). ",
        matched.reference_code,
        matched.reference_title,
        matched.match_method,
        matched.similarity_score
    );
    text.push_str(&format!(
        "Combined {} of {} market source(s) covering {} observations",
        aggregate.contributions.len(),
        aggregate.sources_attempted.len(),
        aggregate.total_sample_size()
    ));
    if (aggregate.location_multiplier - 1.0).abs() > f64::EPSILON {
        text.push_str(&format!(
            ", location multiplier {:.2}",
            aggregate.location_multiplier
        ));
    }
    text.push_str(&format!(
        ". Target {:.0} {} {}; confidence {:.1} ({}).",
        aggregate.band.target, config.currency, config.period, assessment.score, assessment.level
    ));
    text
}
