//! Confidence scoring of recommendations.

pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use scorer::{ConfidenceConfig, ConfidenceScorer};
pub use types::{ConfidenceAssessment, ConfidenceLevel, QueryCompleteness};
