use serde::{Deserialize, Serialize};

/// Five-point percentile summary of a salary distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileSummary {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl PercentileSummary {
    pub fn new(p10: f64, p25: f64, p50: f64, p75: f64, p90: f64) -> Self {
        Self {
            p10,
            p25,
            p50,
            p75,
            p90,
        }
    }

    pub fn from_array(values: [f64; 5]) -> Self {
        let [p10, p25, p50, p75, p90] = values;
        Self::new(p10, p25, p50, p75, p90)
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.p10, self.p25, self.p50, self.p75, self.p90]
    }

    /// Finite, positive and non-decreasing.
    pub fn is_valid(&self) -> bool {
        let values = self.as_array();
        values.iter().all(|v| v.is_finite() && *v > 0.0) && values.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_array(self.as_array().map(|v| v * factor))
    }
}

/// What a market source knows about one (code, location) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceObservation {
    pub sample_size: u64,
    /// Age of the newest data point, in days.
    pub recency_days: u32,
    pub percentiles: PercentileSummary,
}

impl SourceObservation {
    pub fn new(sample_size: u64, recency_days: u32, percentiles: PercentileSummary) -> Self {
        Self {
            sample_size,
            recency_days,
            percentiles,
        }
    }

    /// Usable for aggregation: non-empty sample with valid percentiles.
    pub fn is_usable(&self) -> bool {
        self.sample_size > 0 && self.percentiles.is_valid()
    }
}
