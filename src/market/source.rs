use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::error::MarketDataError;
use super::types::SourceObservation;
use crate::hashing::normalize_text;

#[async_trait]
/// A repository of salary observations keyed by reference code and location.
pub trait MarketDataSource: Send + Sync {
    /// Identity used in contributions and logs.
    fn name(&self) -> &str;

    /// How long a recommendation built on this source stays fresh.
    fn ttl(&self) -> Duration;

    /// Declared reliability constant (> 0).
    fn priority(&self) -> f64;

    /// Data younger than this many days gets full recency weight.
    fn freshness_window_days(&self) -> u32;

    /// Returns `None` when the source has nothing for the pair.
    async fn query(
        &self,
        reference_code: &str,
        location: &str,
    ) -> Result<Option<SourceObservation>, MarketDataError>;
}

/// Source metadata shared by concrete implementations.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceProfile {
    pub name: String,
    pub ttl: Duration,
    pub priority: f64,
    pub freshness_window_days: u32,
}

impl SourceProfile {
    pub fn new(name: impl Into<String>, priority: f64, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl,
            priority,
            freshness_window_days: 30,
        }
    }

    pub fn with_freshness_window(mut self, days: u32) -> Self {
        self.freshness_window_days = days;
        self
    }
}

/// In-memory source. An observation stored under an empty location acts as the
/// fallback for locations without their own data.
#[derive(Debug, Clone)]
pub struct StaticMarketSource {
    profile: SourceProfile,
    observations: HashMap<(String, String), SourceObservation>,
}

impl StaticMarketSource {
    pub fn new(profile: SourceProfile) -> Self {
        Self {
            profile,
            observations: HashMap::new(),
        }
    }

    pub fn with_observation(
        mut self,
        reference_code: &str,
        location: &str,
        observation: SourceObservation,
    ) -> Self {
        self.insert(reference_code, location, observation);
        self
    }

    pub fn insert(&mut self, reference_code: &str, location: &str, observation: SourceObservation) {
        self.observations.insert(
            (reference_code.to_string(), normalize_text(location)),
            observation,
        );
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn lookup(&self, reference_code: &str, location: &str) -> Option<&SourceObservation> {
        let code = reference_code.to_string();
        self.observations
            .get(&(code.clone(), normalize_text(location)))
            .or_else(|| self.observations.get(&(code, String::new())))
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketSource {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn ttl(&self) -> Duration {
        self.profile.ttl
    }

    fn priority(&self) -> f64 {
        self.profile.priority
    }

    fn freshness_window_days(&self) -> u32 {
        self.profile.freshness_window_days
    }

    async fn query(
        &self,
        reference_code: &str,
        location: &str,
    ) -> Result<Option<SourceObservation>, MarketDataError> {
        Ok(self.lookup(reference_code, location).cloned())
    }
}
