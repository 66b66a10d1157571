//! Vector index abstraction for the similarity store.
//!
//! The [`VectorIndex`] trait covers the two operations the pipeline needs:
//! inserting embedded documents and fetching nearest neighbours. Backends
//! are pluggable (SQLite in the app crate, [`memory::InMemoryIndex`] here).
//!
//! Implementations must be `Send + Sync` to be shared across concurrent runs.

pub mod memory;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::DocumentMetadata;

/// A document with its embedding, ready for insertion.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    /// Collision-free identifier (UUID v4).
    pub id: String,
    pub embedding: Vec<f32>,
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// A nearest-neighbour hit.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Cosine distance from the query; lower is closer.
    pub distance: f32,
}

/// Abstract vector index.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](VectorIndex::insert) | Store embedded documents |
/// | [`nearest`](VectorIndex::nearest) | `k` closest documents, nearest first |
/// | [`count`](VectorIndex::count) | Number of stored documents |
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn insert(&self, docs: &[IndexedDocument]) -> Result<(), ProviderError>;

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, ProviderError>;

    async fn count(&self) -> Result<usize, ProviderError>;
}

/// Sort neighbours nearest first and keep `k`. Ties keep insertion order.
pub fn take_nearest(mut hits: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(k);
    hits
}
