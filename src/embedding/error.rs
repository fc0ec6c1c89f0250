use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("embedding request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("invalid embedding response: {reason}")]
    InvalidResponse { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("cannot embed empty text")]
    EmptyInput,
}

impl EmbeddingError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingError::Unavailable { .. } | EmbeddingError::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EmbeddingError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            EmbeddingError::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}
