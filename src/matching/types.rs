use serde::{Deserialize, Serialize};

use crate::vectordb::Neighbor;

/// How a match was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    VectorOnly,
    VectorPlusLlm,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::VectorOnly => write!(f, "vector_only"),
            MatchMethod::VectorPlusLlm => write!(f, "vector_plus_llm"),
        }
    }
}

/// Accepted reference job for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub reference_code: String,
    pub reference_title: String,
    pub reference_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_level: Option<String>,
    /// Cosine similarity of the accepted candidate, in `[0, 1]`.
    pub similarity_score: f32,
    pub match_method: MatchMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl MatchResult {
    pub(crate) fn from_neighbor(
        neighbor: &Neighbor,
        match_method: MatchMethod,
        reasoning: Option<String>,
    ) -> Self {
        Self {
            reference_code: neighbor.job.code.clone(),
            reference_title: neighbor.job.title.clone(),
            reference_family: neighbor.job.family.clone(),
            reference_level: neighbor.job.level.clone(),
            similarity_score: neighbor.similarity.clamp(0.0, 1.0),
            match_method,
            reasoning,
        }
    }
}

/// Why no reference job was accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum NotFoundReason {
    /// The index returned nothing (e.g. unknown family).
    NoCandidates,
    BelowFloor { top_similarity: f32 },
    /// The query shares no vocabulary with any candidate.
    CrossDomain { top_similarity: f32 },
    LowLlmConfidence { confidence: f32 },
    /// The LLM picked a code that was not offered.
    UnknownSelection { code: String },
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundReason::NoCandidates => write!(f, "no reference jobs to compare against"),
            NotFoundReason::BelowFloor { top_similarity } => {
                write!(f, "best similarity {:.3} is below the match floor", top_similarity)
            }
            NotFoundReason::CrossDomain { top_similarity } => write!(
                f,
                "closest reference job ({:.3}) belongs to an unrelated domain",
                top_similarity
            ),
            NotFoundReason::LowLlmConfidence { confidence } => {
                write!(f, "disambiguation confidence {:.2} too low", confidence)
            }
            NotFoundReason::UnknownSelection { code } => {
                write!(f, "disambiguation selected unknown code '{}'", code)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(MatchResult),
    NotFound(NotFoundReason),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    pub fn matched(&self) -> Option<&MatchResult> {
        match self {
            MatchOutcome::Matched(m) => Some(m),
            MatchOutcome::NotFound(_) => None,
        }
    }
}
