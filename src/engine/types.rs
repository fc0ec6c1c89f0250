use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use crate::aggregation::{PayPeriod, SalaryBand, SourceContribution};
use crate::hashing::Fingerprint;
use crate::matching::MatchResult;
use crate::scoring::{ConfidenceLevel, QueryCompleteness};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_LOCATION_LEN: usize = 200;
pub const MAX_REQUESTER_LEN: usize = 256;

/// Inbound recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub job_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub requester_id: String,
    /// Restricts matching to one job family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_hint: Option<String>,
    #[serde(default)]
    pub force_refresh: bool,
}

impl RecommendRequest {
    pub fn new(
        job_title: impl Into<String>,
        location: impl Into<String>,
        requester_id: impl Into<String>,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            description: String::new(),
            location: location.into(),
            requester_id: requester_id.into(),
            family_hint: None,
            force_refresh: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_family_hint(mut self, family: impl Into<String>) -> Self {
        self.family_hint = Some(family.into());
        self
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Rejects empty, oversize or control-character input before any external call.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_field("job_title", &self.job_title, MAX_TITLE_LEN, false)?;
        if self.job_title.trim().is_empty() {
            return Err(EngineError::validation("job_title cannot be empty"));
        }
        check_field("description", &self.description, MAX_DESCRIPTION_LEN, true)?;
        check_field("location", &self.location, MAX_LOCATION_LEN, false)?;
        check_field("requester_id", &self.requester_id, MAX_REQUESTER_LEN, false)?;
        if self.requester_id.trim().is_empty() {
            return Err(EngineError::validation("requester_id cannot be empty"));
        }
        if let Some(family) = &self.family_hint {
            check_field("family_hint", family, MAX_TITLE_LEN, false)?;
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(&self.job_title, &self.location, &self.requester_id)
    }

    pub(crate) fn query(&self) -> JobQuery {
        JobQuery {
            title: self.job_title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            family_hint: self
                .family_hint
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }
}

fn check_field(name: &str, value: &str, max_len: usize, multiline: bool) -> Result<(), EngineError> {
    if value.chars().count() > max_len {
        return Err(EngineError::validation(format!(
            "{} exceeds {} characters",
            name, max_len
        )));
    }
    let allowed = |c: char| multiline && matches!(c, '\n' | '\r' | '\t');
    if value.chars().any(|c| c.is_control() && !allowed(c)) {
        return Err(EngineError::validation(format!(
            "{} contains control characters",
            name
        )));
    }
    Ok(())
}

/// Trimmed request fields handed to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub title: String,
    pub description: String,
    pub location: String,
    pub family_hint: Option<String>,
}

impl JobQuery {
    pub fn completeness(&self) -> QueryCompleteness {
        QueryCompleteness {
            has_description: !self.description.is_empty(),
            has_location: !self.location.is_empty(),
        }
    }
}

/// A versioned salary recommendation. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub job_title: String,
    pub location: String,
    pub currency: String,
    pub period: PayPeriod,
    pub salary_band: SalaryBand,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchResult>,
    pub source_contributions: Vec<SourceContribution>,
    pub explanation: String,
    pub version: u64,
    pub calculated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRecommendationReason {
    NoMatch,
    NoMarketData,
}

/// Structured "no recommendation available" outcome. Not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoRecommendation {
    pub job_title: String,
    pub location: String,
    pub reason: NoRecommendationReason,
    /// Market sources queried; empty when matching failed.
    pub sources_attempted: Vec<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchResult>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecommendOutcome {
    Recommendation(RecommendationResult),
    NoRecommendation(NoRecommendation),
}

impl RecommendOutcome {
    pub fn recommendation(&self) -> Option<&RecommendationResult> {
        match self {
            RecommendOutcome::Recommendation(r) => Some(r),
            RecommendOutcome::NoRecommendation(_) => None,
        }
    }

    pub fn into_recommendation(self) -> Option<RecommendationResult> {
        match self {
            RecommendOutcome::Recommendation(r) => Some(r),
            RecommendOutcome::NoRecommendation(_) => None,
        }
    }

    pub fn no_recommendation(&self) -> Option<&NoRecommendation> {
        match self {
            RecommendOutcome::Recommendation(_) => None,
            RecommendOutcome::NoRecommendation(n) => Some(n),
        }
    }
}
