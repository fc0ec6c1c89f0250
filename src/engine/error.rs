use thiserror::Error;

use crate::aggregation::AggregationError;
use crate::matching::MatchError;

/// Faults surfaced by [`SalaryEngine`](super::SalaryEngine).
///
/// `Clone` so one in-flight failure can be handed to every joined caller.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    #[error("embedding provider unavailable: {reason}")]
    EmbeddingUnavailable { reason: String },

    #[error("reference index unavailable: {reason}")]
    ReferenceIndex { reason: String },

    #[error("engine misconfigured: {reason}")]
    Configuration { reason: String },

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl EngineError {
    /// `true` for transient service faults; `false` for client or configuration errors.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::EmbeddingUnavailable { .. } | EngineError::ReferenceIndex { .. }
        )
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation {
            reason: reason.into(),
        }
    }
}

impl From<MatchError> for EngineError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::EmbeddingUnavailable { reason } => {
                EngineError::EmbeddingUnavailable { reason }
            }
            MatchError::ReferenceIndex(e) => EngineError::ReferenceIndex {
                reason: e.to_string(),
            },
            e @ (MatchError::DimensionMismatch { .. } | MatchError::InvalidConfig { .. }) => {
                EngineError::Configuration {
                    reason: e.to_string(),
                }
            }
            MatchError::Embedding { reason } => EngineError::Internal { reason },
        }
    }
}

impl From<AggregationError> for EngineError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::InvalidConfig { reason } => EngineError::Configuration { reason },
            e @ AggregationError::InsufficientData { .. } => EngineError::Internal {
                reason: e.to_string(),
            },
        }
    }
}
