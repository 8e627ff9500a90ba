//! VectorRetriever: the precedent lookup used by the orchestration loop.

use std::sync::Arc;

use async_trait::async_trait;
use dictamen_core::{PrecedentRecord, PrecedentRetriever, RetrievalError};
use tracing::{debug, warn};

use crate::embedder::QueryEmbedder;
use crate::index::FlatIndex;
use crate::mapping::GoldMapping;
use crate::vector::normalize;

/// A precedent together with its distance to the query.
#[derive(Debug, Clone)]
pub struct ScoredPrecedent {
    pub position: usize,
    pub distance: f32,
    pub record: PrecedentRecord,
}

/// Wraps a precomputed index and its position → precedent mapping.
///
/// Constructed once by the caller and reused across runs; read-only.
pub struct VectorRetriever {
    index: FlatIndex,
    mapping: GoldMapping,
    embedder: Arc<dyn QueryEmbedder>,
    /// Index positions that resolve to a precedent
    available: usize,
}

impl VectorRetriever {
    /// Pair an index with its mapping and a query embedder.
    ///
    /// Rejects an embedder whose model differs from the one recorded in the
    /// index: distances between vectors of different models are meaningless.
    pub fn new(
        index: FlatIndex,
        mapping: GoldMapping,
        embedder: Arc<dyn QueryEmbedder>,
    ) -> Result<Self, RetrievalError> {
        if let Some(index_model) = &index.model {
            if index_model != embedder.model() {
                return Err(RetrievalError::IncompatibleEmbedding(format!(
                    "index built with '{index_model}', queries embedded with '{}'",
                    embedder.model()
                )));
            }
        }

        if mapping.len() != index.len() {
            warn!(
                index = index.len(),
                mapping = mapping.len(),
                "Index and gold mapping sizes differ; unmatched positions will be skipped"
            );
        }

        let available = (0..index.len())
            .filter(|&position| mapping.get(position).is_some())
            .count();

        Ok(Self {
            index,
            mapping,
            embedder,
            available,
        })
    }

    /// Embed `query` under the index's convention.
    async fn query_vector(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vector = self.embedder.embed(query).await?;
        if self.index.normalized {
            normalize(&mut vector);
        }
        Ok(vector)
    }

    /// Top-k precedents with distances, by non-decreasing distance.
    ///
    /// Index positions without a mapping entry are logged and skipped.
    pub async fn search_scored(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredPrecedent>, RetrievalError> {
        let vector = self.query_vector(query).await?;
        let hits = self.index.search(&vector, k)?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.mapping.get(hit.position) {
                Some(record) => results.push(ScoredPrecedent {
                    position: hit.position,
                    distance: hit.distance,
                    record: record.clone(),
                }),
                None => {
                    let err = RetrievalError::OutOfRange {
                        position: hit.position,
                        size: self.mapping.len(),
                    };
                    warn!("Skipping retrieval hit: {err}");
                }
            }
        }

        debug!(k, returned = results.len(), "Precedent search complete");
        Ok(results)
    }
}

#[async_trait]
impl PrecedentRetriever for VectorRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<PrecedentRecord>, RetrievalError> {
        Ok(self
            .search_scored(query, k)
            .await?
            .into_iter()
            .map(|s| s.record)
            .collect())
    }

    fn size(&self) -> usize {
        self.available
    }
}
