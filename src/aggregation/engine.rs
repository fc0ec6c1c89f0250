use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, instrument, warn};

use super::config::AggregationConfig;
use super::error::{AggregationError, AggregationResult};
use super::types::{AggregateBand, SalaryBand, SourceContribution};
use super::weights::{normalize, raw_weight};
use crate::market::{LocationIndex, MarketDataSource, PercentileSummary, SourceObservation};

/// Combines market sources into one weighted salary band.
pub struct AggregationEngine {
    sources: Vec<Arc<dyn MarketDataSource>>,
    locations: Option<Arc<dyn LocationIndex>>,
    config: AggregationConfig,
}

impl std::fmt::Debug for AggregationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationEngine")
            .field("sources", &self.source_names())
            .field("has_location_index", &self.locations.is_some())
            .field("config", &self.config)
            .finish()
    }
}

struct Usable<'a> {
    source: &'a dyn MarketDataSource,
    observation: SourceObservation,
}

impl AggregationEngine {
    pub fn new(
        sources: Vec<Arc<dyn MarketDataSource>>,
        config: AggregationConfig,
    ) -> AggregationResult<Self> {
        config.validate()?;
        for source in &sources {
            let priority = source.priority();
            if !(priority.is_finite() && priority > 0.0) {
                return Err(AggregationError::InvalidConfig {
                    reason: format!("source '{}' has non-positive priority", source.name()),
                });
            }
        }
        Ok(Self {
            sources,
            locations: None,
            config,
        })
    }

    pub fn with_location_index(mut self, locations: Arc<dyn LocationIndex>) -> Self {
        self.locations = Some(locations);
        self
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Queries every source concurrently and combines the usable observations.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn aggregate(
        &self,
        reference_code: &str,
        location: &str,
    ) -> AggregationResult<AggregateBand> {
        let timeout = self.config.source_timeout;
        let queries = self.sources.iter().map(|source| async move {
            let result =
                tokio::time::timeout(timeout, source.query(reference_code, location)).await;
            (source.as_ref(), result)
        });

        let mut usable: Vec<Usable<'_>> = Vec::new();
        for (source, result) in join_all(queries).await {
            match result {
                Ok(Ok(Some(observation))) if observation.is_usable() => {
                    usable.push(Usable {
                        source,
                        observation,
                    });
                }
                Ok(Ok(Some(observation))) => {
                    debug!(
                        source = source.name(),
                        sample_size = observation.sample_size,
                        "Discarding unusable observation"
                    );
                }
                Ok(Ok(None)) => {
                    debug!(source = source.name(), "Source has no data");
                }
                Ok(Err(e)) => {
                    warn!(source = source.name(), error = %e, "Market source failed");
                }
                Err(_) => {
                    warn!(
                        source = source.name(),
                        timeout_ms = timeout.as_millis() as u64,
                        "Market source timed out"
                    );
                }
            }
        }

        let sources_attempted = self.source_names();
        if usable.is_empty() {
            return Err(AggregationError::InsufficientData { sources_attempted });
        }

        let mut weights: Vec<f64> = usable
            .iter()
            .map(|u| {
                raw_weight(
                    u.source.priority(),
                    u.observation.recency_days,
                    u.source.freshness_window_days(),
                    u.observation.sample_size,
                    &self.config,
                )
            })
            .collect();
        normalize(&mut weights);

        let mut combined = [0.0f64; 5];
        for (u, weight) in usable.iter().zip(&weights) {
            for (slot, value) in combined.iter_mut().zip(u.observation.percentiles.as_array()) {
                *slot += weight * value;
            }
        }

        let location_multiplier = match &self.locations {
            Some(index) => index
                .lookup(location)
                .await
                .filter(|m| m.is_finite() && *m > 0.0)
                .unwrap_or(1.0),
            None => 1.0,
        };

        let band = build_band(
            PercentileSummary::from_array(combined).scaled(location_multiplier),
            self.config.min_spread,
        );

        let min_ttl = usable
            .iter()
            .map(|u| u.source.ttl())
            .min()
            .unwrap_or(Duration::ZERO);

        let contributions = usable
            .iter()
            .zip(&weights)
            .map(|(u, weight)| SourceContribution {
                source_name: u.source.name().to_string(),
                sample_size: u.observation.sample_size,
                recency_days: u.observation.recency_days,
                weight_applied: *weight,
                observations: u.observation.percentiles,
            })
            .collect::<Vec<_>>();

        debug!(
            contributing = contributions.len(),
            target = band.target,
            location_multiplier,
            "Aggregated salary band"
        );

        Ok(AggregateBand {
            band,
            contributions,
            sources_attempted,
            min_ttl,
            location_multiplier,
        })
    }
}

/// Sorts the percentiles and derives target and recommended range.
pub fn build_band(percentiles: PercentileSummary, min_spread: f64) -> SalaryBand {
    let mut values = percentiles.as_array();
    values.sort_by(|a, b| a.total_cmp(b));
    let [p10, p25, p50, p75, p90] = values;

    let target = p50;
    SalaryBand {
        target,
        recommended_min: p25.min(target * (1.0 - min_spread)),
        recommended_max: p75.max(target * (1.0 + min_spread)),
        p10,
        p25,
        p50,
        p75,
        p90,
    }
}
