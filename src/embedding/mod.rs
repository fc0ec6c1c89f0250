//! Embedding providers.
//!
//! The matcher only depends on [`EmbeddingProvider`]. Concrete providers:
//! - [`HashingEmbedder`]: deterministic, offline (tests, demos).
//! - [`RemoteEmbedder`]: OpenAI-compatible HTTP endpoint.
//! - [`CachedEmbedder`]: memoising wrapper for either.
//!
//! [`Embedder`] selects between the concrete providers at runtime.

mod cached;
mod error;
mod hashed;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod remote;


pub use cached::CachedEmbedder;
pub use error::EmbeddingError;
pub use hashed::HashingEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use remote::{RemoteEmbedder, RemoteEmbedderConfig, parse_embedding_response};

/// Turns text into a fixed-length dense vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector returned by [`embed`](Self::embed).
    fn dimension(&self) -> usize;

    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;
}

/// Runtime-selected provider.
#[derive(Debug, Clone)]
pub enum Embedder {
    Hashing(HashingEmbedder),
    Remote(RemoteEmbedder),
}

impl EmbeddingProvider for Embedder {
    fn dimension(&self) -> usize {
        match self {
            Embedder::Hashing(e) => e.dimension(),
            Embedder::Remote(e) => e.dimension(),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            Embedder::Hashing(e) => e.embed(text).await,
            Embedder::Remote(e) => e.embed(text).await,
        }
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for std::sync::Arc<P> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbeddingError>> + Send {
        (**self).embed(text)
    }
}
