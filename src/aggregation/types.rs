use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::market::PercentileSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriod {
    #[default]
    Annual,
    Monthly,
    Hourly,
}

impl PayPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayPeriod::Annual => "annual",
            PayPeriod::Monthly => "monthly",
            PayPeriod::Hourly => "hourly",
        }
    }
}

impl std::fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PayPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "yearly" => Ok(PayPeriod::Annual),
            "monthly" => Ok(PayPeriod::Monthly),
            "hourly" => Ok(PayPeriod::Hourly),
            other => Err(format!("unknown pay period '{}'", other)),
        }
    }
}

/// Recommended salary band.
///
/// Percentiles are non-decreasing and `recommended_min < target < recommended_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBand {
    pub target: f64,
    pub recommended_min: f64,
    pub recommended_max: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl SalaryBand {
    pub fn percentiles(&self) -> PercentileSummary {
        PercentileSummary::new(self.p10, self.p25, self.p50, self.p75, self.p90)
    }

    pub fn is_consistent(&self) -> bool {
        self.percentiles()
            .as_array()
            .windows(2)
            .all(|w| w[0] <= w[1])
            && self.recommended_min < self.target
            && self.target < self.recommended_max
    }
}

/// One source's share in an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContribution {
    pub source_name: String,
    pub sample_size: u64,
    pub recency_days: u32,
    /// Normalised weight in `[0, 1]`; contributions of one aggregate sum to 1.
    pub weight_applied: f64,
    pub observations: PercentileSummary,
}

/// Output of [`AggregationEngine::aggregate`](super::AggregationEngine::aggregate).
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateBand {
    pub band: SalaryBand,
    pub contributions: Vec<SourceContribution>,
    /// Every source queried, contributing or not.
    pub sources_attempted: Vec<String>,
    /// Smallest TTL among contributing sources.
    pub min_ttl: Duration,
    pub location_multiplier: f64,
}

impl AggregateBand {
    pub fn total_sample_size(&self) -> u64 {
        self.contributions.iter().map(|c| c.sample_size).sum()
    }
}
