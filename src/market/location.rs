use std::collections::HashMap;

use async_trait::async_trait;

use crate::hashing::normalize_text;

#[async_trait]
/// Cost-of-living lookup.
pub trait LocationIndex: Send + Sync {
    /// Multiplier for `location`, `None` when unknown.
    async fn lookup(&self, location: &str) -> Option<f64>;
}

/// Fixed table of multipliers keyed by normalised location.
///
/// `"Austin, TX"` falls back to `"austin"` when only the city is listed.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationIndex {
    multipliers: HashMap<String, f64>,
}

impl StaticLocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores non-finite or non-positive multipliers.
    pub fn with_multiplier(mut self, location: &str, multiplier: f64) -> Self {
        self.insert(location, multiplier);
        self
    }

    pub fn insert(&mut self, location: &str, multiplier: f64) {
        if multiplier.is_finite() && multiplier > 0.0 {
            self.multipliers.insert(normalize_text(location), multiplier);
        }
    }

    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    pub fn get(&self, location: &str) -> Option<f64> {
        let key = normalize_text(location);
        if let Some(m) = self.multipliers.get(&key) {
            return Some(*m);
        }
        let city = key.split(',').next().map(str::trim)?;
        self.multipliers.get(city).copied()
    }
}

#[async_trait]
impl LocationIndex for StaticLocationIndex {
    async fn lookup(&self, location: &str) -> Option<f64> {
        self.get(location)
    }
}
