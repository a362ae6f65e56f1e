//! Vector store abstraction for Consulta.
//!
//! Provides a trait-based interface for different vector database backends.
//! Stores are read-only during queries; both backends iterate documents in
//! insertion order, which the keyword fallback's stable ranking relies on.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A document stored in the vector database.
///
/// One document is one chunk of a transcript. Documents are immutable after
/// indexing; identity is the `id`, never text equality — two identical
/// windows at different offsets are distinct documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Name of the originating .srt file.
    pub source: String,
    /// Text content of this chunk.
    pub text: String,
    /// Order of this chunk within its source.
    pub chunk_index: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Key-value metadata; always carries at least "source".
    pub metadata: HashMap<String, String>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(source: String, text: String, chunk_index: i32, embedding: Vec<f32>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source.clone());

        Self {
            id: Uuid::new_v4(),
            source,
            text,
            chunk_index,
            embedding,
            metadata,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Source file name.
    pub source: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// When the source was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk upsert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for similar documents by embedding.
    ///
    /// Results are ordered by score descending; equal scores keep insertion
    /// order, so output is deterministic for a fixed index.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Every indexed document, in insertion order.
    ///
    /// This is the full-scan access path the keyword fallback uses.
    async fn all_documents(&self) -> Result<Vec<Document>>;

    /// Delete documents by source file name.
    async fn delete_by_source(&self, source: &str) -> Result<usize>;

    /// List all indexed sources.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Check if a source is indexed.
    async fn is_source_indexed(&self, source: &str) -> Result<bool>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_document_metadata_carries_source() {
        let doc = Document::new(
            "Meditación 107.srt".to_string(),
            "contenido".to_string(),
            0,
            vec![],
        );
        assert_eq!(
            doc.metadata.get("source").map(String::as_str),
            Some("Meditación 107.srt")
        );
    }

    #[test]
    fn test_identical_text_distinct_identity() {
        let a = Document::new("x.srt".to_string(), "same text".to_string(), 0, vec![]);
        let b = Document::new("x.srt".to_string(), "same text".to_string(), 1, vec![]);
        assert_ne!(a.id, b.id);
    }
}
