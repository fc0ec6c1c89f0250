//! Memoising wrapper around any [`EmbeddingProvider`].
//!
//! Keys are BLAKE3 hashes of the input text, values are shared vectors. Eviction is
//! handled by `moka` (size-bounded).

use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use super::EmbeddingProvider;
use super::error::EmbeddingError;
use crate::hashing::hash_text;

pub struct CachedEmbedder<P: EmbeddingProvider> {
    inner: P,
    entries: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    const DEFAULT_CAPACITY: u64 = 10_000;

    pub fn new(inner: P) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: P, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = hash_text(text);
        if let Some(hit) = self.entries.get(&key) {
            debug!("Embedding cache hit");
            return Ok(hit.as_ref().clone());
        }

        let vector = self.inner.embed(text).await?;
        self.entries.insert(key, Arc::new(vector.clone()));
        Ok(vector)
    }
}

impl<P: EmbeddingProvider> std::fmt::Debug for CachedEmbedder<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder")
            .field("entries", &self.entries.entry_count())
            .field("dimension", &self.inner.dimension())
            .finish()
    }
}
