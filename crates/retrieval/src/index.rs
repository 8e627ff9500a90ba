//! Exact nearest-neighbour index over precomputed precedent vectors.
//!
//! The index is built offline (one vector per gold record, in mapping order)
//! and stored as JSON together with the convention it was built under: the
//! embedding model, the metric, and whether vectors were L2-normalized.
//! Queries must follow the same convention; see [`crate::VectorRetriever`].

use std::path::Path;

use dictamen_core::RetrievalError;
use serde::{Deserialize, Serialize};

use crate::vector::Metric;

/// A flat (brute-force) index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    /// Embedding model the vectors were produced with, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub dimension: usize,

    #[serde(default)]
    pub metric: Metric,

    /// Whether stored vectors are unit length
    #[serde(default)]
    pub normalized: bool,

    vectors: Vec<Vec<f32>>,
}

/// One search hit: position in the index and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

impl FlatIndex {
    /// Build an index from in-memory vectors, checking their shape.
    pub fn new(
        vectors: Vec<Vec<f32>>,
        metric: Metric,
        normalized: bool,
        model: Option<String>,
    ) -> Result<Self, RetrievalError> {
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        let index = Self {
            model,
            dimension,
            metric,
            normalized,
            vectors,
        };
        index.check_shape("<memory>")?;
        Ok(index)
    }

    /// Load an index file written by the gold index builder.
    pub fn load(path: &Path) -> Result<Self, RetrievalError> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| RetrievalError::IndexLoad {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        let index: Self = serde_json::from_str(&content).map_err(|e| RetrievalError::IndexLoad {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        index.check_shape(&shown)?;
        tracing::debug!(path = %shown, size = index.len(), dimension = index.dimension, "Loaded precedent index");
        Ok(index)
    }

    fn check_shape(&self, path: &str) -> Result<(), RetrievalError> {
        if let Some((i, v)) = self
            .vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(RetrievalError::IndexLoad {
                path: path.to_string(),
                reason: format!(
                    "vector {i} has {} components, expected {}",
                    v.len(),
                    self.dimension
                ),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The `min(k, len)` nearest vectors, by non-decreasing distance.
    ///
    /// Ties keep index order, so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, RetrievalError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                distance: self.metric.distance(query, v),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }
}
