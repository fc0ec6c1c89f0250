use std::time::Duration;

use super::error::AggregationError;
use super::types::PayPeriod;
use crate::constants::{DEFAULT_CURRENCY, DEFAULT_SOURCE_TIMEOUT};

pub const DEFAULT_SAMPLE_SATURATION: f64 = 100.0;
pub const DEFAULT_SAMPLE_DAMPING: f64 = 0.25;
pub const DEFAULT_SAMPLE_CAP: f64 = 1.5;
pub const DEFAULT_RECENCY_HALF_LIFE_DAYS: f64 = 90.0;
pub const DEFAULT_RECENCY_FLOOR: f64 = 0.2;
pub const DEFAULT_MIN_SPREAD: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// ISO-4217 code every source is normalised to.
    pub currency: String,
    pub period: PayPeriod,
    /// Sample size at which `sample_factor` reaches 1.0.
    pub sample_saturation: f64,
    /// Log growth rate of `sample_factor` past saturation.
    pub sample_damping: f64,
    /// Upper bound of `sample_factor`.
    pub sample_cap: f64,
    pub recency_half_life_days: f64,
    /// Lower bound of `recency_factor`.
    pub recency_floor: f64,
    /// Minimum relative distance of the recommended range from the target.
    pub min_spread: f64,
    pub source_timeout: Duration,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            period: PayPeriod::Annual,
            sample_saturation: DEFAULT_SAMPLE_SATURATION,
            sample_damping: DEFAULT_SAMPLE_DAMPING,
            sample_cap: DEFAULT_SAMPLE_CAP,
            recency_half_life_days: DEFAULT_RECENCY_HALF_LIFE_DAYS,
            recency_floor: DEFAULT_RECENCY_FLOOR,
            min_spread: DEFAULT_MIN_SPREAD,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

impl AggregationConfig {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_period(mut self, period: PayPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), AggregationError> {
        let invalid = |reason: &str| AggregationError::InvalidConfig {
            reason: reason.to_string(),
        };

        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("currency must be a three-letter ISO-4217 code"));
        }
        if !positive(self.sample_saturation) {
            return Err(invalid("sample_saturation must be > 0"));
        }
        if !(self.sample_damping.is_finite() && self.sample_damping >= 0.0 && self.sample_cap >= 1.0) {
            return Err(invalid("sample_damping must be >= 0 and sample_cap >= 1"));
        }
        if !positive(self.recency_half_life_days) {
            return Err(invalid("recency_half_life_days must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.recency_floor) {
            return Err(invalid("recency_floor must lie in [0, 1]"));
        }
        if !(self.min_spread > 0.0 && self.min_spread < 1.0) {
            return Err(invalid("min_spread must lie in (0, 1)"));
        }
        if self.source_timeout.is_zero() {
            return Err(invalid("source_timeout must be > 0"));
        }
        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
