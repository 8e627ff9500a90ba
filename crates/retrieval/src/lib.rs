//! Precedent retrieval for Dictamen.
//!
//! A flat vector index over the curated gold set, its position → precedent
//! mapping, and the query embedder, combined into [`VectorRetriever`].

pub mod embedder;
pub mod index;
pub mod mapping;
pub mod retriever;
pub mod vector;

pub use embedder::{ProviderEmbedder, QueryEmbedder};
pub use index::{FlatIndex, Neighbor};
pub use mapping::{GoldMapping, load_mapping, parse_mapping};
pub use retriever::{ScoredPrecedent, VectorRetriever};
pub use vector::Metric;
