//! Cross-cutting, shared constants.
//!
//! Component-specific tunables live on their config structs
//! ([`MatcherConfig`](crate::matching::MatcherConfig),
//! [`AggregationConfig`](crate::aggregation::AggregationConfig), ...). The values here
//! are the defaults those structs start from, plus a few invariants shared by several
//! modules.
//!
//! # Dimension Invariants
//!
//! The embedding provider and the reference index must agree on vector length. Use
//! [`validate_embedding_dim`] at the seam between them to fail fast instead of
//! silently scoring mismatched vectors as zero similarity.

use std::time::Duration;

use thiserror::Error;

/// Default dimension of the offline [`HashingEmbedder`](crate::embedding::HashingEmbedder).
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_ACCEPT_THRESHOLD: f32 = 0.85;
pub const DEFAULT_MATCH_FLOOR: f32 = 0.55;
pub const DEFAULT_AMBIGUITY_MARGIN: f32 = 0.05;
pub const DEFAULT_LLM_CONFIDENCE_FLOOR: f32 = 0.5;

/// Number of versions kept per fingerprint.
pub const DEFAULT_VERSION_RETENTION: usize = 5;

pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(3);

pub const DEFAULT_CURRENCY: &str = "USD";

/// Provider and index disagree on vector length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimValidationError {
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,

    #[error("embedder produces {actual}-dimensional vectors, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use paygrade::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(256, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(384, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
