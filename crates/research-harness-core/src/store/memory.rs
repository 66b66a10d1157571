//! In-memory [`VectorIndex`] for tests and ephemeral sessions.
//!
//! Uses a `Vec` behind `std::sync::RwLock`. Search is brute-force cosine
//! distance over all stored vectors.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::embedding::cosine_distance;
use crate::error::ProviderError;

use super::{take_nearest, IndexedDocument, Neighbor, VectorIndex};

pub struct InMemoryIndex {
    docs: RwLock<Vec<IndexedDocument>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> ProviderError {
    ProviderError::Storage("in-memory index lock poisoned".to_string())
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn insert(&self, docs: &[IndexedDocument]) -> Result<(), ProviderError> {
        let mut stored = self.docs.write().map_err(|_| poisoned())?;
        stored.extend_from_slice(docs);
        Ok(())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, ProviderError> {
        let stored = self.docs.read().map_err(|_| poisoned())?;
        let hits = stored
            .iter()
            .map(|d| Neighbor {
                id: d.id.clone(),
                content: d.content.clone(),
                metadata: d.metadata.clone(),
                distance: cosine_distance(query, &d.embedding),
            })
            .collect();
        Ok(take_nearest(hits, k))
    }

    async fn count(&self) -> Result<usize, ProviderError> {
        Ok(self.docs.read().map_err(|_| poisoned())?.len())
    }
}
