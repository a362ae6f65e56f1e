//! In-memory vector store implementation.
//!
//! Useful for testing and small corpora. Documents live in a Vec so scans
//! always run in insertion order.

use super::{cosine_similarity, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{ConsultaError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self
            .documents
            .write()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;

        for doc in docs {
            // re-upserting an id keeps its original position
            match store.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc.clone(),
                None => store.push(doc.clone()),
            }
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;

        let mut results: Vec<SearchResult> = docs
            .iter()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc.clone(),
            })
            .collect();

        // stable sort: equal scores keep insertion order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn all_documents(&self) -> Result<Vec<Document>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;
        Ok(docs.clone())
    }

    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;
        let initial_len = docs.len();
        docs.retain(|doc| doc.source != source);
        Ok(initial_len - docs.len())
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;

        let mut source_map: HashMap<String, IndexedSource> = HashMap::new();

        for doc in docs.iter() {
            let entry = source_map
                .entry(doc.source.clone())
                .or_insert_with(|| IndexedSource {
                    source: doc.source.clone(),
                    chunk_count: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.chunk_count += 1;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = source_map.into_values().collect();
        sources.sort_by(|a, b| a.source.cmp(&b.source));

        Ok(sources)
    }

    async fn is_source_indexed(&self, source: &str) -> Result<bool> {
        let docs = self
            .documents
            .read()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;
        Ok(docs.iter().any(|d| d.source == source))
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self
            .documents
            .read()
            .map_err(|e| ConsultaError::VectorStore(format!("Lock poisoned: {}", e)))?;
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let doc1 = Document::new(
            "uno.srt".to_string(),
            "Hola mundo".to_string(),
            0,
            vec![1.0, 0.0, 0.0],
        );
        let doc2 = Document::new(
            "uno.srt".to_string(),
            "Adiós mundo".to_string(),
            1,
            vec![0.0, 1.0, 0.0],
        );

        store.upsert_batch(&[doc1, doc2]).await.unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].chunk_count, 2);
    }

    #[tokio::test]
    async fn test_all_documents_keeps_insertion_order() {
        let store = MemoryVectorStore::new();

        let docs: Vec<Document> = (0..5)
            .map(|i| Document::new("a.srt".to_string(), format!("chunk {}", i), i, vec![]))
            .collect();
        let ids: Vec<_> = docs.iter().map(|d| d.id).collect();

        store.upsert_batch(&docs).await.unwrap();

        let scanned = store.all_documents().await.unwrap();
        let scanned_ids: Vec<_> = scanned.iter().map(|d| d.id).collect();
        assert_eq!(scanned_ids, ids);
    }

    #[tokio::test]
    async fn test_search_tie_break_is_insertion_order() {
        let store = MemoryVectorStore::new();

        // identical embeddings, so all scores tie
        let docs: Vec<Document> = (0..3)
            .map(|i| Document::new("a.srt".to_string(), format!("chunk {}", i), i, vec![1.0, 0.0]))
            .collect();
        let ids: Vec<_> = docs.iter().map(|d| d.id).collect();

        store.upsert_batch(&docs).await.unwrap();

        let results = store.search(&[1.0, 0.0], 3).await.unwrap();
        let result_ids: Vec<_> = results.iter().map(|r| r.document.id).collect();
        assert_eq!(result_ids, ids);
    }

    #[tokio::test]
    async fn test_delete_by_source() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                Document::new("a.srt".to_string(), "uno".to_string(), 0, vec![]),
                Document::new("b.srt".to_string(), "dos".to_string(), 0, vec![]),
            ])
            .await
            .unwrap();

        assert!(store.is_source_indexed("a.srt").await.unwrap());
        assert_eq!(store.delete_by_source("a.srt").await.unwrap(), 1);
        assert!(!store.is_source_indexed("a.srt").await.unwrap());
        assert_eq!(store.document_count().await.unwrap(), 1);
    }
}
