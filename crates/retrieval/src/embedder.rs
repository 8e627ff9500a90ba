//! Query embedding.

use std::sync::Arc;

use async_trait::async_trait;
use dictamen_core::provider::{EmbeddingRequest, Provider};
use dictamen_core::RetrievalError;

/// Turns query text into a vector in the index's embedding space.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    /// Name of the embedding model, compared against the index's record.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Embeds queries through a [`Provider`]'s embeddings endpoint.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl QueryEmbedder for ProviderEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![text.to_string()],
            })
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::EmbeddingFailed("provider returned no embedding".into()))
    }
}
