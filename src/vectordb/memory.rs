use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::VectorDbError;
use super::model::{Neighbor, ReferenceJobRecord};
use super::{ReferenceIndex, cosine_similarity};

/// Brute-force cosine index held in memory.
#[derive(Debug)]
pub struct InMemoryReferenceIndex {
    dimension: usize,
    records: RwLock<HashMap<String, ReferenceJobRecord>>,
}

impl InMemoryReferenceIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces a record by code.
    pub fn upsert(&self, record: ReferenceJobRecord) -> Result<(), VectorDbError> {
        if record.embedding.len() != self.dimension {
            return Err(VectorDbError::InvalidDimension {
                expected: self.dimension,
                actual: record.embedding.len(),
            });
        }
        self.records.write().insert(record.job.code.clone(), record);
        Ok(())
    }

    /// Inserts a batch, rejecting duplicate codes within it.
    pub fn insert_all(&self, records: Vec<ReferenceJobRecord>) -> Result<(), VectorDbError> {
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            if !seen.insert(record.job.code.as_str()) {
                return Err(VectorDbError::DuplicateCode {
                    code: record.job.code.clone(),
                });
            }
        }
        for record in records {
            self.upsert(record)?;
        }
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<ReferenceJobRecord> {
        self.records.read().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn search(&self, vector: &[f32], family: Option<&str>, k: usize) -> Vec<Neighbor> {
        let records = self.records.read();

        let mut hits: Vec<Neighbor> = records
            .values()
            .filter(|r| family.is_none_or(|f| r.job.in_family(f)))
            .filter_map(|r| {
                let similarity = cosine_similarity(vector, &r.embedding);
                similarity.is_finite().then(|| Neighbor {
                    job: r.job.clone(),
                    similarity: similarity.clamp(0.0, 1.0),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.job.code.cmp(&b.job.code))
        });
        hits.truncate(k);
        hits
    }
}

impl ReferenceIndex for InMemoryReferenceIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn nearest(
        &self,
        vector: &[f32],
        family: Option<&str>,
        k: usize,
    ) -> Result<Vec<Neighbor>, VectorDbError> {
        if vector.len() != self.dimension {
            return Err(VectorDbError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(self.search(vector, family, k))
    }
}
