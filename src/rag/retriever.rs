use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Result};
use scholar_vector::{DistanceMetric, FlatIndex};
use std::sync::Arc;

/// In-memory retriever over one document's chunks.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: FlatIndex<String>,
}

impl Retriever {
    /// Embed `chunks` and index them for cosine search.
    pub async fn build(embedder: Arc<dyn Embedder>, chunks: Vec<String>) -> Result<Self> {
        Self::build_with_metric(embedder, chunks, DistanceMetric::Cosine).await
    }

    pub async fn build_with_metric(
        embedder: Arc<dyn Embedder>,
        chunks: Vec<String>,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let vectors = embedder.embed_documents(&chunks).await?;
        let index = FlatIndex::from_batch(metric, vectors, chunks)
            .map_err(|e| AppError::Internal(format!("Failed to index chunks: {}", e)))?;

        tracing::debug!(
            chunks = index.len(),
            metric = %metric,
            dimensions = index.dimensions().unwrap_or(0),
            "Built retrieval index"
        );

        Ok(Self { embedder, index })
    }

    /// Top `k` chunk texts for `query`, most similar first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(query).await?;
        let hits = self
            .index
            .search(&query_vector, k)
            .map_err(|e| AppError::Internal(format!("Similarity search failed: {}", e)))?;

        Ok(hits.into_iter().map(|hit| hit.payload).collect())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
