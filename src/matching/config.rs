use std::time::Duration;

use super::error::MatchError;
use crate::constants::{
    DEFAULT_ACCEPT_THRESHOLD, DEFAULT_AMBIGUITY_MARGIN, DEFAULT_EMBED_TIMEOUT,
    DEFAULT_LLM_CONFIDENCE_FLOOR, DEFAULT_LLM_TIMEOUT, DEFAULT_MATCH_FLOOR, DEFAULT_TOP_K,
};

/// Retries after the first failed embedding attempt.
pub const DEFAULT_EMBED_RETRIES: u32 = 2;

/// First backoff delay; doubles on every retry.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Thresholds and limits for [`JobMatcher`](super::JobMatcher).
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Top similarity at or above which a candidate is accepted without the LLM.
    pub accept_threshold: f32,
    /// Top similarity below which nothing is accepted.
    pub match_floor: f32,
    /// Candidates within this distance of the top similarity count as ambiguous.
    pub ambiguity_margin: f32,
    /// Minimum LLM selection confidence.
    pub llm_confidence_floor: f32,
    pub top_k: usize,
    pub embed_timeout: Duration,
    pub llm_timeout: Duration,
    pub embed_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            match_floor: DEFAULT_MATCH_FLOOR,
            ambiguity_margin: DEFAULT_AMBIGUITY_MARGIN,
            llm_confidence_floor: DEFAULT_LLM_CONFIDENCE_FLOOR,
            top_k: DEFAULT_TOP_K,
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            embed_retries: DEFAULT_EMBED_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl MatcherConfig {
    pub fn with_thresholds(mut self, match_floor: f32, accept_threshold: f32) -> Self {
        self.match_floor = match_floor;
        self.accept_threshold = accept_threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.embed_retries = retries;
        self.retry_backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.match_floor) || !unit.contains(&self.accept_threshold) {
            return Err(MatchError::InvalidConfig {
                reason: "thresholds must lie in [0, 1]".to_string(),
            });
        }
        if self.match_floor > self.accept_threshold {
            return Err(MatchError::InvalidConfig {
                reason: format!(
                    "match_floor {} exceeds accept_threshold {}",
                    self.match_floor, self.accept_threshold
                ),
            });
        }
        if !unit.contains(&self.ambiguity_margin) || !unit.contains(&self.llm_confidence_floor) {
            return Err(MatchError::InvalidConfig {
                reason: "ambiguity_margin and llm_confidence_floor must lie in [0, 1]".to_string(),
            });
        }
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig {
                reason: "top_k must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
