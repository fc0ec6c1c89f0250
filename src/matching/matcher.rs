use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::config::MatcherConfig;
use super::error::MatchError;
use super::llm::Disambiguator;
use super::types::{MatchMethod, MatchOutcome, MatchResult, NotFoundReason};
use crate::constants::validate_embedding_dim;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::hashing::normalize_text;
use crate::vectordb::{Neighbor, ReferenceIndex};

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "be", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "as", "and", "or", "but", "not", "no", "this", "that", "these", "those", "it", "its",
    "all", "each", "other", "some", "such", "than", "very", "just", "who", "what", "which",
    "senior", "junior", "lead", "principal", "staff", "associate", "assistant", "head", "chief",
    "i", "ii", "iii", "iv", "sr", "jr",
];

/// Maps a free-text job onto the reference taxonomy.
pub struct JobMatcher<E, I> {
    embedder: E,
    index: I,
    disambiguator: Option<Arc<dyn Disambiguator>>,
    config: MatcherConfig,
}

impl<E, I> std::fmt::Debug for JobMatcher<E, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobMatcher")
            .field("has_disambiguator", &self.disambiguator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<E: EmbeddingProvider, I: ReferenceIndex> JobMatcher<E, I> {
    pub fn new(embedder: E, index: I, config: MatcherConfig) -> Result<Self, MatchError> {
        config.validate()?;
        validate_embedding_dim(embedder.dimension(), index.dimension()).map_err(|_| {
            MatchError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            }
        })?;
        Ok(Self {
            embedder,
            index,
            disambiguator: None,
            config,
        })
    }

    pub fn with_disambiguator(mut self, disambiguator: Arc<dyn Disambiguator>) -> Self {
        self.disambiguator = Some(disambiguator);
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Matches with the configured `top_k`.
    pub async fn match_job(
        &self,
        title: &str,
        description: &str,
        family_hint: Option<&str>,
    ) -> Result<MatchOutcome, MatchError> {
        self.match_job_top_k(title, description, family_hint, self.config.top_k)
            .await
    }

    #[instrument(skip(self, description), fields(family = family_hint.unwrap_or("*")))]
    pub async fn match_job_top_k(
        &self,
        title: &str,
        description: &str,
        family_hint: Option<&str>,
        top_k: usize,
    ) -> Result<MatchOutcome, MatchError> {
        let text = query_text(title, description);
        let vector = self.embed_with_retry(&text).await?;

        if vector.len() != self.index.dimension() {
            return Err(MatchError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: vector.len(),
            });
        }

        let neighbors = self
            .index
            .nearest(&vector, family_hint, top_k.max(1))
            .await?;

        let Some(top) = neighbors.first() else {
            debug!("Reference index returned no candidates");
            return Ok(MatchOutcome::NotFound(NotFoundReason::NoCandidates));
        };
        let top_similarity = top.similarity;

        debug!(
            top_code = %top.job.code,
            top_similarity,
            candidates = neighbors.len(),
            "Nearest reference jobs"
        );

        if top_similarity >= self.config.accept_threshold {
            info!(code = %top.job.code, similarity = top_similarity, "Accepted vector match");
            return Ok(MatchOutcome::Matched(MatchResult::from_neighbor(
                top,
                MatchMethod::VectorOnly,
                None,
            )));
        }

        if !top_similarity.is_finite() || top_similarity < self.config.match_floor {
            debug!(top_similarity, floor = self.config.match_floor, "Below match floor");
            return Ok(MatchOutcome::NotFound(NotFoundReason::BelowFloor {
                top_similarity,
            }));
        }

        if is_cross_domain(title, &neighbors) {
            debug!(top_similarity, "Query shares no vocabulary with candidates");
            return Ok(MatchOutcome::NotFound(NotFoundReason::CrossDomain {
                top_similarity,
            }));
        }

        let contenders = neighbors
            .iter()
            .filter(|n| top_similarity - n.similarity <= self.config.ambiguity_margin)
            .count();

        let disambiguator = match &self.disambiguator {
            Some(d) if contenders > 1 => d,
            _ => {
                info!(code = %top.job.code, contenders, "Accepted unambiguous band match");
                return Ok(MatchOutcome::Matched(MatchResult::from_neighbor(
                    top,
                    MatchMethod::VectorOnly,
                    None,
                )));
            }
        };

        let selection = tokio::time::timeout(
            self.config.llm_timeout,
            disambiguator.disambiguate(title, description, &neighbors),
        )
        .await;

        let choice = match selection {
            Ok(Ok(choice)) => choice,
            Ok(Err(e)) => {
                warn!(error = %e, "Disambiguation failed; using top vector candidate");
                return Ok(MatchOutcome::Matched(MatchResult::from_neighbor(
                    top,
                    MatchMethod::VectorOnly,
                    None,
                )));
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.llm_timeout.as_millis() as u64,
                    "Disambiguation timed out; using top vector candidate"
                );
                return Ok(MatchOutcome::Matched(MatchResult::from_neighbor(
                    top,
                    MatchMethod::VectorOnly,
                    None,
                )));
            }
        };

        if choice.confidence < self.config.llm_confidence_floor {
            debug!(confidence = choice.confidence, "Disambiguation confidence too low");
            return Ok(MatchOutcome::NotFound(NotFoundReason::LowLlmConfidence {
                confidence: choice.confidence,
            }));
        }

        let Some(selected) = neighbors.iter().find(|n| n.job.code == choice.code) else {
            warn!(code = %choice.code, "Disambiguation selected a code outside the candidates");
            return Ok(MatchOutcome::NotFound(NotFoundReason::UnknownSelection {
                code: choice.code,
            }));
        };

        info!(
            code = %selected.job.code,
            similarity = selected.similarity,
            confidence = choice.confidence,
            "Accepted disambiguated match"
        );
        let reasoning = Some(choice.reasoning).filter(|r| !r.trim().is_empty());
        Ok(MatchOutcome::Matched(MatchResult::from_neighbor(
            selected,
            MatchMethod::VectorPlusLlm,
            reasoning,
        )))
    }

    async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        let mut attempt = 0u32;
        loop {
            let result = match tokio::time::timeout(
                self.config.embed_timeout,
                self.embedder.embed(text),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(EmbeddingError::Timeout {
                    timeout_ms: self.config.embed_timeout.as_millis() as u64,
                }),
            };

            match result {
                Ok(vector) if vector.iter().any(|x| !x.is_finite()) => {
                    return Err(EmbeddingError::InvalidResponse {
                        reason: "embedding contains non-finite components".to_string(),
                    }
                    .into());
                }
                Ok(vector) => return Ok(vector),
                Err(e) if e.is_retryable() && attempt < self.config.embed_retries => {
                    let backoff = self.config.retry_backoff * 2u32.saturating_pow(attempt);
                    warn!(attempt = attempt + 1, error = %e, ?backoff, "Embedding failed; retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Normalised text embedded for a query.
pub fn query_text(title: &str, description: &str) -> String {
    normalize_text(&format!("{} {}", title, description))
}

pub(crate) fn content_tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1 && !STOP_WORDS.contains(w))
        .map(stem)
        .collect()
}

fn stem(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// True when the title shares no content token with any candidate's title or family.
pub(crate) fn is_cross_domain(title: &str, candidates: &[Neighbor]) -> bool {
    let query = content_tokens(title);
    if query.is_empty() {
        return false;
    }
    !candidates.iter().any(|n| {
        let mut vocabulary = content_tokens(&n.job.title);
        vocabulary.extend(content_tokens(&n.job.family));
        !query.is_disjoint(&vocabulary)
    })
}
