use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, ScoredPoint,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use std::collections::HashMap;
use tracing::debug;

use super::ReferenceIndex;
use super::error::VectorDbError;
use super::model::{Neighbor, ReferenceJob, ReferenceJobRecord, point_id_for_code};

const FAMILY_KEY: &str = "family_key";

#[derive(Clone)]
/// Reference index backed by a Qdrant collection (cosine distance).
pub struct QdrantReferenceIndex {
    client: Qdrant,
    url: String,
    collection: String,
    dimension: usize,
}

impl std::fmt::Debug for QdrantReferenceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantReferenceIndex")
            .field("url", &self.url)
            .field("collection", &self.collection)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl QdrantReferenceIndex {
    /// Creates a client for `url`; does not touch the collection.
    pub fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            dimension,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Ensures the collection exists (creates it if missing).
    pub async fn ensure_collection(&self) -> Result<(), VectorDbError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        if !exists {
            let vectors_config = VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine);
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(vectors_config),
                )
                .await
                .map_err(|e| VectorDbError::CreateCollectionFailed {
                    collection: self.collection.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Upserts reference records; point ids derive from the code.
    pub async fn upsert(&self, records: Vec<ReferenceJobRecord>) -> Result<(), VectorDbError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(records.len());
        for record in records {
            if record.embedding.len() != self.dimension {
                return Err(VectorDbError::InvalidDimension {
                    expected: self.dimension,
                    actual: record.embedding.len(),
                });
            }

            let job = record.job;
            let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
            payload.insert("code".to_string(), job.code.clone().into());
            payload.insert("title".to_string(), job.title.into());
            payload.insert(
                FAMILY_KEY.to_string(),
                job.family.trim().to_lowercase().into(),
            );
            payload.insert("family".to_string(), job.family.into());
            if let Some(level) = job.level {
                payload.insert("level".to_string(), level.into());
            }

            points.push(PointStruct::new(
                point_id_for_code(&job.code),
                record.embedding,
                payload,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

impl ReferenceIndex for QdrantReferenceIndex {
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

        let mut search_builder =
            SearchPointsBuilder::new(&self.collection, vector.to_vec(), k as u64)
                .with_payload(true);

        if let Some(family) = family {
            let filter = Filter::must([Condition::matches(
                FAMILY_KEY,
                family.trim().to_lowercase(),
            )]);
            search_builder = search_builder.filter(filter);
        }

        let response = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let hits: Vec<Neighbor> = response
            .result
            .into_iter()
            .filter_map(neighbor_from_scored_point)
            .collect();

        debug!(hits = hits.len(), "Qdrant reference search complete");
        Ok(hits)
    }
}

fn neighbor_from_scored_point(point: ScoredPoint) -> Option<Neighbor> {
    if !point.score.is_finite() {
        return None;
    }
    let payload = point.payload;
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    let job = ReferenceJob {
        code: text("code")?,
        title: text("title").unwrap_or_default(),
        family: text("family").unwrap_or_default(),
        level: text("level"),
    };

    Some(Neighbor {
        job,
        similarity: point.score.clamp(0.0, 1.0),
    })
}
