use serde::{Deserialize, Serialize};

/// Qualitative confidence bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// `>= 75` High, `>= 50` Medium, below Low.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            ConfidenceLevel::High
        } else if score >= 50.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
        }
    }
}

/// Which optional query fields the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryCompleteness {
    pub has_description: bool,
    pub has_location: bool,
}

/// Score in `[0, 100]` and its level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub score: f64,
    pub level: ConfidenceLevel,
}

impl ConfidenceAssessment {
    /// Clamps into `[0, 100]`; a non-finite score counts as zero.
    pub fn new(score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            score,
            level: ConfidenceLevel::from_score(score),
        }
    }
}
