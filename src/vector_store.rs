//! Similarity store: an [`Embedder`] in front of a [`VectorIndex`].

use std::sync::Arc;

use research_harness_core::embedding::{embed_one, Embedder};
use research_harness_core::store::{IndexedDocument, VectorIndex};
use research_harness_core::{DocumentRecord, ProviderError, RagDoc};

pub struct SimilarityStore {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SimilarityStore {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Embed and insert `docs` under fresh UUID v4 ids. Returns the ids in
    /// input order.
    pub async fn add_documents(&self, docs: &[DocumentRecord]) -> Result<Vec<String>, ProviderError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(ProviderError::Parse(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                docs.len()
            )));
        }

        let indexed: Vec<IndexedDocument> = docs
            .iter()
            .zip(vectors)
            .map(|(doc, embedding)| IndexedDocument {
                id: uuid::Uuid::new_v4().to_string(),
                embedding,
                content: doc.content.clone(),
                metadata: doc.metadata.clone(),
            })
            .collect();

        self.index.insert(&indexed).await?;
        tracing::debug!(count = indexed.len(), "added documents to similarity store");
        Ok(indexed.into_iter().map(|d| d.id).collect())
    }

    /// The `k` documents nearest to `query`, nearest first. `score` is the
    /// cosine distance.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RagDoc>, ProviderError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let vector = embed_one(self.embedder.as_ref(), query).await?;
        let hits = self.index.nearest(&vector, k).await?;

        Ok(hits
            .into_iter()
            .map(|hit| RagDoc {
                source: hit.metadata.source.clone(),
                content: hit.content,
                metadata: hit.metadata,
                score: hit.distance,
            })
            .collect())
    }

    pub async fn count(&self) -> Result<usize, ProviderError> {
        self.index.count().await
    }
}
