use tracing::debug;

use super::types::{ConfidenceAssessment, QueryCompleteness};
use crate::aggregation::SourceContribution;
use crate::matching::{MatchMethod, MatchResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceConfig {
    pub base: f64,
    /// Points for a perfect match; scaled by similarity.
    pub match_ceiling: f64,
    pub llm_penalty: f64,
    pub per_source: f64,
    pub source_cap: f64,
    pub sample_bonus_max: f64,
    /// Total sample size at which the sample bonus is maxed out.
    pub sample_saturation: u64,
    pub description_bonus: f64,
    pub location_bonus: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 50.0,
            match_ceiling: 20.0,
            llm_penalty: 4.0,
            per_source: 8.0,
            source_cap: 24.0,
            sample_bonus_max: 6.0,
            sample_saturation: 1000,
            description_bonus: 3.0,
            location_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    pub fn score(
        &self,
        matched: Option<&MatchResult>,
        contributions: &[SourceContribution],
        completeness: QueryCompleteness,
    ) -> ConfidenceAssessment {
        let c = &self.config;

        let match_points = matched.map_or(0.0, |m| {
            let points = c.match_ceiling * f64::from(m.similarity_score.clamp(0.0, 1.0));
            match m.match_method {
                MatchMethod::VectorOnly => points,
                MatchMethod::VectorPlusLlm => points - c.llm_penalty,
            }
        });

        let source_points = (c.per_source * contributions.len() as f64).min(c.source_cap);

        let total_sample: u64 = contributions.iter().map(|s| s.sample_size).sum();
        let sample_points = if total_sample == 0 || c.sample_saturation == 0 {
            0.0
        } else {
            let ratio = (total_sample as f64).ln_1p() / (c.sample_saturation as f64).ln_1p();
            c.sample_bonus_max * ratio.min(1.0)
        };

        let mut raw = c.base + match_points + source_points + sample_points;
        if completeness.has_description {
            raw += c.description_bonus;
        }
        if completeness.has_location {
            raw += c.location_bonus;
        }

        let assessment = ConfidenceAssessment::new(raw);
        debug!(
            match_points,
            source_points,
            sample_points,
            score = assessment.score,
            "Confidence computed"
        );
        assessment
    }
}
