//! SQLite-backed [`VectorIndex`].
//!
//! Vectors are stored as little-endian f32 BLOBs in the `documents` table.
//! Nearest-neighbour search loads every vector of the query's
//! dimensionality and ranks by cosine distance in process.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use research_harness_core::embedding::{blob_to_vec, cosine_distance, vec_to_blob};
use research_harness_core::store::{take_nearest, IndexedDocument, Neighbor, VectorIndex};
use research_harness_core::{DocumentMetadata, ProviderError};

pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    /// Wrap a pool whose schema was created by
    /// [`run_migrations`](crate::migrate::run_migrations).
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage(e: sqlx::Error) -> ProviderError {
    ProviderError::Storage(e.to_string())
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn insert(&self, docs: &[IndexedDocument]) -> Result<(), ProviderError> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        for doc in docs {
            let metadata_json = serde_json::to_string(&doc.metadata)
                .map_err(|e| ProviderError::Parse(e.to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO documents (id, content, source, doc_type, metadata_json, embedding, dims, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&doc.id)
            .bind(&doc.content)
            .bind(&doc.metadata.source)
            .bind(&doc.metadata.doc_type)
            .bind(&metadata_json)
            .bind(vec_to_blob(&doc.embedding))
            .bind(doc.embedding.len() as i64)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, ProviderError> {
        let rows = sqlx::query(
            "SELECT id, content, metadata_json, embedding FROM documents WHERE dims = ? ORDER BY created_at, rowid",
        )
        .bind(query.len() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let hits = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let metadata_json: String = row.get("metadata_json");
                Neighbor {
                    id: row.get("id"),
                    content: row.get("content"),
                    metadata: serde_json::from_str::<DocumentMetadata>(&metadata_json)
                        .unwrap_or_default(),
                    distance: cosine_distance(query, &blob_to_vec(&blob)),
                }
            })
            .collect();

        Ok(take_nearest(hits, k))
    }

    async fn count(&self) -> Result<usize, ProviderError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, migrate};
    use tempfile::TempDir;

    async fn open() -> (TempDir, SqliteIndex) {
        let tmp = TempDir::new().unwrap();
        let pool = db::connect_path(&tmp.path().join("index.sqlite"))
            .await
            .unwrap();
        migrate::run_migrations(&pool).await.unwrap();
        (tmp, SqliteIndex::new(pool))
    }

    fn doc(id: &str, embedding: Vec<f32>) -> IndexedDocument {
        IndexedDocument {
            id: id.to_string(),
            embedding,
            content: format!("content {id}"),
            metadata: DocumentMetadata {
                source: "https://example.com/a.pdf".to_string(),
                doc_type: "pdf".to_string(),
                title: None,
                chunk_id: Some(0),
            },
        }
    }

    #[tokio::test]
    async fn test_insert_and_nearest() {
        let (_tmp, index) = open().await;
        index
            .insert(&[doc("a", vec![0.0, 1.0]), doc("b", vec![1.0, 0.0])])
            .await
            .unwrap();

        let hits = index.nearest(&[1.0, 0.1], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
        assert_eq!(hits[0].metadata.doc_type, "pdf");
        assert_eq!(hits[0].metadata.chunk_id, Some(0));
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_other_dims_ignored() {
        let (_tmp, index) = open().await;
        index.insert(&[doc("a", vec![1.0, 0.0, 0.0])]).await.unwrap();
        assert!(index.nearest(&[1.0, 0.0], 3).await.unwrap().is_empty());
    }
}
