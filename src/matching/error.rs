use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("embedding provider unavailable: {reason}")]
    EmbeddingUnavailable { reason: String },

    #[error("embedding failed: {reason}")]
    Embedding { reason: String },

    #[error("embedding dimension {actual} does not match reference index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("reference index error: {0}")]
    ReferenceIndex(#[from] VectorDbError),

    #[error("invalid matcher configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl MatchError {
    /// Service-side faults a caller may retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MatchError::EmbeddingUnavailable { .. } | MatchError::ReferenceIndex(_)
        )
    }
}

impl From<EmbeddingError> for MatchError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::DimensionMismatch { expected, actual } => {
                MatchError::DimensionMismatch { expected, actual }
            }
            e if e.is_retryable() => MatchError::EmbeddingUnavailable {
                reason: e.to_string(),
            },
            e => MatchError::Embedding {
                reason: e.to_string(),
            },
        }
    }
}

/// Failure of the LLM disambiguation step. Never surfaced to callers.
#[derive(Debug, Error)]
pub enum DisambiguationError {
    #[error("disambiguator unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("invalid disambiguator response: {reason}")]
    InvalidResponse { reason: String },

    #[error("invalid disambiguator configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for DisambiguationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DisambiguationError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            DisambiguationError::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}
