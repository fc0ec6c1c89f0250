use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::error::MarketDataError;
use super::source::{MarketDataSource, StaticMarketSource};
use super::types::SourceObservation;

/// Wraps a [`StaticMarketSource`] with latency, failure injection and a call counter.
#[derive(Debug)]
pub struct MockMarketSource {
    inner: StaticMarketSource,
    delay: Option<Duration>,
    failing: bool,
    calls: AtomicUsize,
}

impl MockMarketSource {
    pub fn new(inner: StaticMarketSource) -> Self {
        Self {
            inner,
            delay: None,
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockMarketSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn ttl(&self) -> Duration {
        self.inner.ttl()
    }

    fn priority(&self) -> f64 {
        self.inner.priority()
    }

    fn freshness_window_days(&self) -> u32 {
        self.inner.freshness_window_days()
    }

    async fn query(
        &self,
        reference_code: &str,
        location: &str,
    ) -> Result<Option<SourceObservation>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(MarketDataError::Unavailable {
                source_name: self.name().to_string(),
                reason: "mock source offline".to_string(),
            });
        }
        self.inner.query(reference_code, location).await
    }
}
