use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use super::EmbeddingProvider;
use super::error::EmbeddingError;
use crate::hashing::normalize_text;

/// Scripted embedder for tests: fixed vectors per text, optional failures and latency.
#[derive(Debug)]
pub struct MockEmbedder {
    dimension: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    default_vector: Option<Vec<f32>>,
    failures_remaining: AtomicU32,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: RwLock::new(HashMap::new()),
            default_vector: None,
            failures_remaining: AtomicU32::new(0),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Registers the vector returned for `text` (matched after normalisation).
    pub fn with_vector(self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.write().insert(normalize_text(text), vector);
        self
    }

    /// Vector returned for any text without a registered vector.
    pub fn with_default(mut self, vector: Vec<f32>) -> Self {
        self.default_vector = Some(vector);
        self
    }

    /// Fails the next `n` calls with [`EmbeddingError::Unavailable`].
    pub fn failing_times(self, n: u32) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(EmbeddingError::Unavailable {
                reason: "mock provider offline".to_string(),
            });
        }

        let key = normalize_text(text);
        if let Some(vector) = self.vectors.read().get(&key) {
            return Ok(vector.clone());
        }

        self.default_vector
            .clone()
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                reason: format!("no mock vector registered for '{}'", key),
            })
    }
}
