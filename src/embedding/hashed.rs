//! Deterministic feature-hashing embedder.
//!
//! Words and character trigrams are hashed into a fixed number of signed buckets and
//! the result is L2-normalised. Texts that share vocabulary land close together, which
//! is enough for offline runs and tests without a model server.

use tracing::debug;

use super::EmbeddingProvider;
use super::error::EmbeddingError;
use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::hashing::hash_text;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.35;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Synchronous embedding; the async trait method delegates here.
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut vector = vec![0.0f32; self.dimension];

        for word in &words {
            self.accumulate(&mut vector, word, WORD_WEIGHT);

            let padded: Vec<char> = format!("#{}#", word).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.accumulate(&mut vector, &trigram, TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        debug!(words = words.len(), dim = self.dimension, "Hashed embedding");
        Ok(vector)
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = hash_text(feature);
        let mut idx_bytes = [0u8; 8];
        idx_bytes.copy_from_slice(&hash[0..8]);
        let bucket = (u64::from_le_bytes(idx_bytes) % self.dimension as u64) as usize;
        let sign = if hash[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }
}
