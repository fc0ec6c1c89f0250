use super::*;
use crate::aggregation::SourceContribution;
use crate::market::PercentileSummary;
use crate::matching::{MatchMethod, MatchResult};

fn matched(similarity: f32, method: MatchMethod) -> MatchResult {
    MatchResult {
        reference_code: "ENG-SWE".to_string(),
        reference_title: "Software Engineer".to_string(),
        reference_family: "Engineering".to_string(),
        reference_level: None,
        similarity_score: similarity,
        match_method: method,
        reasoning: None,
    }
}

fn contribution(sample_size: u64) -> SourceContribution {
    SourceContribution {
        source_name: "s".to_string(),
        sample_size,
        recency_days: 1,
        weight_applied: 1.0,
        observations: PercentileSummary::new(1.0, 2.0, 3.0, 4.0, 5.0),
    }
}

const FULL: QueryCompleteness = QueryCompleteness {
    has_description: true,
    has_location: true,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_level_boundaries() {
    assert_eq!(ConfidenceLevel::from_score(100.0), ConfidenceLevel::High);
    assert_eq!(ConfidenceLevel::from_score(75.0), ConfidenceLevel::High);
    assert_eq!(ConfidenceLevel::from_score(74.9), ConfidenceLevel::Medium);
    assert_eq!(ConfidenceLevel::from_score(50.0), ConfidenceLevel::Medium);
    assert_eq!(ConfidenceLevel::from_score(49.99), ConfidenceLevel::Low);
    assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::Low);
}

#[test]
fn test_base_only() {
    let scorer = ConfidenceScorer::default();
    let assessment = scorer.score(None, &[], QueryCompleteness::default());
    assert!(close(assessment.score, 50.0));
    assert_eq!(assessment.level, ConfidenceLevel::Medium);
}

#[test]
fn test_full_signal_is_high() {
    let scorer = ConfidenceScorer::default();
    let m = matched(0.95, MatchMethod::VectorOnly);
    let sources = vec![contribution(50), contribution(120)];

    let assessment = scorer.score(Some(&m), &sources, FULL);

    // 50 + 19 + 16 + ~4.5 + 3 + 3
    assert!((95.0..97.0).contains(&assessment.score));
    assert_eq!(assessment.level, ConfidenceLevel::High);
}

#[test]
fn test_score_keeps_fraction() {
    let scorer = ConfidenceScorer::default();
    let m = matched(0.5, MatchMethod::VectorOnly);
    let assessment = scorer.score(Some(&m), &[contribution(10)], QueryCompleteness::default());

    let sample = 6.0 * (11f64).ln() / (1001f64).ln();
    assert!(close(assessment.score, 50.0 + 10.0 + 8.0 + sample));
    assert!(assessment.score.fract() != 0.0);
}

#[test]
fn test_llm_match_is_penalised() {
    let scorer = ConfidenceScorer::default();
    let sources = vec![contribution(100)];
    let vector = scorer.score(Some(&matched(0.8, MatchMethod::VectorOnly)), &sources, FULL);
    let llm = scorer.score(Some(&matched(0.8, MatchMethod::VectorPlusLlm)), &sources, FULL);
    assert!(close(vector.score - llm.score, 4.0));
}

#[test]
fn test_source_count_is_capped() {
    let scorer = ConfidenceScorer::default();
    let three: Vec<_> = (0..3).map(|_| contribution(1)).collect();
    let ten: Vec<_> = (0..10).map(|_| contribution(1)).collect();

    let a = scorer.score(None, &three, QueryCompleteness::default());
    let b = scorer.score(None, &ten, QueryCompleteness::default());

    assert!(b.score - a.score <= 1.0);
    assert!(b.score < 100.0);
}

#[test]
fn test_sample_bonus_saturates() {
    let scorer = ConfidenceScorer::default();
    let big = scorer.score(None, &[contribution(1000)], QueryCompleteness::default());
    let huge = scorer.score(None, &[contribution(1_000_000)], QueryCompleteness::default());
    assert!(close(big.score, huge.score));
    assert!(close(big.score, 64.0));
}

#[test]
fn test_score_is_clamped() {
    let scorer = ConfidenceScorer::new(ConfidenceConfig {
        base: 95.0,
        ..Default::default()
    });
    let m = matched(1.0, MatchMethod::VectorOnly);
    let assessment = scorer.score(Some(&m), &[contribution(5000)], FULL);
    assert_eq!(assessment.score, 100.0);

    let scorer = ConfidenceScorer::new(ConfidenceConfig {
        base: -40.0,
        ..Default::default()
    });
    assert_eq!(scorer.score(None, &[], QueryCompleteness::default()).score, 0.0);
}

#[test]
fn test_assessment_new_clamps() {
    let assessment = ConfidenceAssessment::new(250.0);
    assert_eq!(assessment.score, 100.0);
    assert_eq!(assessment.level, ConfidenceLevel::High);

    let assessment = ConfidenceAssessment::new(f64::NAN);
    assert_eq!(assessment.score, 0.0);
    assert_eq!(assessment.level, ConfidenceLevel::Low);
}
