//! PrecedentRetriever trait: top-k similarity lookup over the gold set.

use async_trait::async_trait;

use crate::document::PrecedentRecord;
use crate::error::RetrievalError;

/// Answers top-k similarity queries over curated precedents.
///
/// Implementations return at most `k` records (all of them when the index is
/// smaller), ordered by non-decreasing distance to `query`.
#[async_trait]
pub trait PrecedentRetriever: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<PrecedentRecord>, RetrievalError>;

    /// Number of records available.
    fn size(&self) -> usize;
}
