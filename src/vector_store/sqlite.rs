//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Scans run `ORDER BY rowid`, so document order is insertion order. For
//! very large corpora, consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_similarity, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{ConsultaError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    text TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);
"#;

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL keeps concurrent readers cheap
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let metadata_json: String = row.get(5)?;
        let indexed_at_str: String = row.get(6)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source: row.get(1)?,
            text: row.get(2)?,
            chunk_index: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            metadata: serde_json::from_str(&metadata_json).unwrap_or_default(),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);
            let metadata_json = serde_json::to_string(&doc.metadata)?;

            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, source, text, chunk_index, embedding, metadata, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    doc.id.to_string(),
                    doc.source,
                    doc.text,
                    doc.chunk_index,
                    embedding_bytes,
                    metadata_json,
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source, text, chunk_index, embedding, metadata, indexed_at
            FROM documents
            ORDER BY rowid
            "#,
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;

        let mut results: Vec<SearchResult> = docs
            .filter_map(|doc_result| doc_result.ok())
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc,
                    score,
                }
            })
            .collect();

        // stable sort over rowid order: equal scores stay deterministic
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn all_documents(&self) -> Result<Vec<Document>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source, text, chunk_index, embedding, metadata, indexed_at
            FROM documents
            ORDER BY rowid
            "#,
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;
        Ok(docs.filter_map(|d| d.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let deleted = conn.execute("DELETE FROM documents WHERE source = ?1", params![source])?;

        info!("Deleted {} documents for source {}", deleted, source);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source, COUNT(*) as chunk_count, MAX(indexed_at) as indexed_at
            FROM documents
            GROUP BY source
            ORDER BY source
            "#,
        )?;

        let sources = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(2)?;
            Ok(IndexedSource {
                source: row.get(0)?,
                chunk_count: row.get(1)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        Ok(sources.filter_map(|s| s.ok()).collect())
    }

    async fn is_source_indexed(&self, source: &str) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE source = ?1",
            params![source],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConsultaError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str, text: &str, chunk_index: i32, embedding: Vec<f32>) -> Document {
        Document::new(source.to_string(), text.to_string(), chunk_index, embedding)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let original = doc("uno.srt", "Hola mundo", 0, vec![0.5, -0.25, 1.0]);
        store.upsert_batch(&[original.clone()]).await.unwrap();

        let all = store.all_documents().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, original.id);
        assert_eq!(all[0].text, "Hola mundo");
        assert_eq!(all[0].embedding, vec![0.5, -0.25, 1.0]);
        assert_eq!(
            all[0].metadata.get("source").map(String::as_str),
            Some("uno.srt")
        );
    }

    #[tokio::test]
    async fn test_scan_order_is_insertion_order() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let docs: Vec<Document> = (0..4)
            .map(|i| doc("a.srt", &format!("chunk {}", i), i, vec![]))
            .collect();
        let ids: Vec<_> = docs.iter().map(|d| d.id).collect();

        store.upsert_batch(&docs).await.unwrap();

        let scanned = store.all_documents().await.unwrap();
        let scanned_ids: Vec<_> = scanned.iter().map(|d| d.id).collect();
        assert_eq!(scanned_ids, ids);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let near = doc("a.srt", "near", 0, vec![1.0, 0.0]);
        let far = doc("a.srt", "far", 1, vec![0.0, 1.0]);
        store.upsert_batch(&[far, near.clone()]).await.unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].document.id, near.id);
    }

    #[tokio::test]
    async fn test_delete_and_list_sources() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert_batch(&[
                doc("a.srt", "uno", 0, vec![]),
                doc("a.srt", "dos", 1, vec![]),
                doc("b.srt", "tres", 0, vec![]),
            ])
            .await
            .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source, "a.srt");
        assert_eq!(sources[0].chunk_count, 2);

        assert_eq!(store.delete_by_source("a.srt").await.unwrap(), 2);
        assert!(!store.is_source_indexed("a.srt").await.unwrap());
        assert_eq!(store.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert_batch(&[doc("a.srt", "persistente", 0, vec![1.0])])
                .await
                .unwrap();
        }

        let reopened = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(reopened.document_count().await.unwrap(), 1);
    }
}
