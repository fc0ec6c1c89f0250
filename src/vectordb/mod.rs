//! Reference job index (nearest-neighbour search over the job taxonomy).

pub mod client;
pub mod error;
pub mod memory;
pub mod model;

#[cfg(test)]
mod tests;

pub use client::QdrantReferenceIndex;
pub use error::VectorDbError;
pub use memory::InMemoryReferenceIndex;
pub use model::{Neighbor, ReferenceJob, ReferenceJobRecord, point_id_for_code};

pub const DEFAULT_COLLECTION_NAME: &str = "paygrade_reference_jobs";

/// Nearest-neighbour search over reference jobs.
pub trait ReferenceIndex: Send + Sync {
    /// Dimension every stored embedding has.
    fn dimension(&self) -> usize;

    /// Returns up to `k` jobs ranked by descending cosine similarity, restricted to
    /// `family` when given.
    fn nearest(
        &self,
        vector: &[f32],
        family: Option<&str>,
        k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Neighbor>, VectorDbError>> + Send;
}

impl<I: ReferenceIndex> ReferenceIndex for std::sync::Arc<I> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn nearest(
        &self,
        vector: &[f32],
        family: Option<&str>,
        k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Neighbor>, VectorDbError>> + Send {
        (**self).nearest(vector, family, k)
    }
}

/// Runtime-selected index.
#[derive(Debug)]
pub enum IndexBackend {
    Memory(InMemoryReferenceIndex),
    Qdrant(QdrantReferenceIndex),
}

impl ReferenceIndex for IndexBackend {
    fn dimension(&self) -> usize {
        match self {
            IndexBackend::Memory(i) => i.dimension(),
            IndexBackend::Qdrant(i) => i.dimension(),
        }
    }

    async fn nearest(
        &self,
        vector: &[f32],
        family: Option<&str>,
        k: usize,
    ) -> Result<Vec<Neighbor>, VectorDbError> {
        match self {
            IndexBackend::Memory(i) => i.nearest(vector, family, k).await,
            IndexBackend::Qdrant(i) => i.nearest(vector, family, k).await,
        }
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
