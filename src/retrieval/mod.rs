//! Hybrid retrieval: dense vector search with a keyword-presence fallback.
//!
//! A query first runs through vector similarity search. If any query keyword
//! is absent from the retrieved texts, the full document store is scanned for
//! those missing keywords and the best literal matches are placed ahead of
//! the vector results. The fallback only runs when needed; when the vector
//! results already contain every keyword, no scan happens at all.

mod keyword;

pub use keyword::{KeywordScanner, ScoredDocument};

use crate::config::RetrievalSettings;
use crate::embedding::Embedder;
use crate::error::{ConsultaError, Result};
use crate::vector_store::{Document, VectorStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Limits for one retrieval call.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Documents to retrieve by vector similarity.
    pub k_vector: usize,
    /// Additional documents the keyword fallback may contribute.
    pub k_keyword: usize,
    /// Per-call timeout; `None` disables.
    pub timeout: Option<Duration>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k_vector: 100,
            k_keyword: 20,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl From<&RetrievalSettings> for RetrievalConfig {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            k_vector: settings.k_vector,
            k_keyword: settings.k_keyword,
            timeout: (settings.timeout_seconds > 0)
                .then(|| Duration::from_secs(settings.timeout_seconds)),
        }
    }
}

/// Two-stage retriever over a session-owned store and embedder.
///
/// Holds no cross-call state: the session owns the index and the embedding
/// provider, the retriever borrows them per call, and concurrent calls are
/// independent.
pub struct HybridRetriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    scanner: KeywordScanner,
    config: RetrievalConfig,
}

impl HybridRetriever {
    /// Create a retriever with default limits.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            scanner: KeywordScanner::new(),
            config: RetrievalConfig::default(),
        }
    }

    /// Set the retrieval configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Retrieve a deduplicated, priority-ordered document list for a query.
    ///
    /// Keyword-matched documents come first (they contain a query term
    /// verbatim), then vector matches in rank order. Output length is at
    /// most `k_vector + k_keyword`. Embedding and store failures propagate
    /// unchanged; the caller owns any retry policy.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.retrieve_inner(query))
                .await
                .map_err(|_| ConsultaError::RetrievalTimeout(timeout.as_secs()))?,
            None => self.retrieve_inner(query).await,
        }
    }

    async fn retrieve_inner(&self, query: &str) -> Result<Vec<Document>> {
        // 1. dense pass
        let query_embedding = self.embedder.embed(query).await?;
        let vector_docs: Vec<Document> = self
            .store
            .search(&query_embedding, self.config.k_vector)
            .await?
            .into_iter()
            .map(|result| result.document)
            .collect();

        // 2. which query keywords did the dense pass miss?
        let keywords = self.scanner.keywords(query);
        let blob = vector_docs
            .iter()
            .map(|doc| doc.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let missing = self.scanner.missing_keywords(&keywords, &blob);

        // 3. sparse pass, only when something is missing
        let mut keyword_docs = Vec::new();
        if !missing.is_empty() {
            debug!(
                "Keywords missing from top-{} vector results: {:?}",
                self.config.k_vector, missing
            );

            let store_docs = self.store.all_documents().await?;
            let ranked = self
                .scanner
                .rank(store_docs, &missing, self.config.k_keyword);

            debug!("Keyword fallback contributed {} documents", ranked.len());
            keyword_docs = ranked.into_iter().map(|scored| scored.document).collect();
        }

        let combined = merge_unique(keyword_docs, vector_docs);
        debug!("Combined {} documents", combined.len());
        Ok(combined)
    }
}

/// Merge two document lists, keeping first occurrences only.
///
/// `primary` entries keep their positions ahead of `secondary`; a document
/// present in both lists (same id) stays at its primary rank. Dedup is by
/// identity, not text equality.
pub fn merge_unique(primary: Vec<Document>, secondary: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<uuid::Uuid> = HashSet::new();
    let mut combined = Vec::with_capacity(primary.len() + secondary.len());

    for doc in primary.into_iter().chain(secondary) {
        if seen.insert(doc.id) {
            combined.push(doc);
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{IndexedSource, MemoryVectorStore, SearchResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder returning one fixed vector for every input, so tests control
    /// vector ranking purely through document embeddings.
    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.vector.clone()).collect())
        }

        fn dimensions(&self) -> usize {
            self.vector.len()
        }
    }

    /// Store wrapper that counts full scans, to prove the fallback is skipped.
    struct ScanCountingStore {
        inner: MemoryVectorStore,
        scans: AtomicUsize,
    }

    #[async_trait]
    impl VectorStore for ScanCountingStore {
        async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
            self.inner.upsert_batch(docs).await
        }

        async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
            self.inner.search(query_embedding, limit).await
        }

        async fn all_documents(&self) -> Result<Vec<Document>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.all_documents().await
        }

        async fn delete_by_source(&self, source: &str) -> Result<usize> {
            self.inner.delete_by_source(source).await
        }

        async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
            self.inner.list_sources().await
        }

        async fn is_source_indexed(&self, source: &str) -> Result<bool> {
            self.inner.is_source_indexed(source).await
        }

        async fn document_count(&self) -> Result<usize> {
            self.inner.document_count().await
        }
    }

    fn doc(source: &str, text: &str, index: i32, embedding: Vec<f32>) -> Document {
        Document::new(source.to_string(), text.to_string(), index, embedding)
    }

    async fn seeded_store(docs: &[Document]) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        store.upsert_batch(docs).await.unwrap();
        store
    }

    fn retriever(
        store: Arc<dyn VectorStore>,
        k_vector: usize,
        k_keyword: usize,
    ) -> HybridRetriever {
        HybridRetriever::new(store, Arc::new(FixedEmbedder { vector: vec![1.0, 0.0] }))
            .with_config(RetrievalConfig {
                k_vector,
                k_keyword,
                timeout: None,
            })
    }

    #[tokio::test]
    async fn test_fallback_recovers_literal_match_missed_by_vectors() {
        // one document carries the literal term, far from the query vector;
        // 99 near-but-irrelevant documents crowd the vector top-5
        let mut docs: Vec<Document> = (0..99)
            .map(|i| doc("ruido.srt", &format!("nothing relevant here {}", i), i, vec![1.0, 0.0]))
            .collect();
        let target = doc(
            "X.srt",
            "the ra lineage bis trick jac appears here",
            0,
            vec![0.0, 1.0],
        );
        docs.push(target.clone());

        let store = seeded_store(&docs).await;
        let retriever = retriever(store, 5, 20);

        let results = retriever.retrieve("trick lineage").await.unwrap();

        assert_eq!(results[0].id, target.id);
        assert!(results.len() <= 5 + 20);
    }

    #[tokio::test]
    async fn test_retrieval_is_deterministic() {
        let docs: Vec<Document> = (0..30)
            .map(|i| doc("a.srt", &format!("chunk número {}", i), i, vec![1.0, 0.0]))
            .collect();
        let store = seeded_store(&docs).await;
        let retriever = retriever(store, 10, 5);

        let first = retriever.retrieve("consulta número").await.unwrap();
        let second = retriever.retrieve("consulta número").await.unwrap();

        let first_ids: Vec<_> = first.iter().map(|d| d.id).collect();
        let second_ids: Vec<_> = second.iter().map(|d| d.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_no_duplicates_in_output() {
        let docs: Vec<Document> = (0..20)
            .map(|i| doc("a.srt", &format!("texto compartido {}", i), i, vec![1.0, 0.0]))
            .collect();
        let store = seeded_store(&docs).await;
        let retriever = retriever(store, 15, 10);

        let results = retriever.retrieve("palabra inexistente").await.unwrap();

        let mut seen = HashSet::new();
        for d in &results {
            assert!(seen.insert(d.id), "duplicate document in output");
        }
    }

    #[tokio::test]
    async fn test_fallback_skipped_when_keywords_covered() {
        let covered = doc("a.srt", "el linaje completo está aquí", 0, vec![1.0, 0.0]);
        let other = doc("a.srt", "otro fragmento cualquiera", 1, vec![0.9, 0.1]);
        let inner = MemoryVectorStore::new();
        inner.upsert_batch(&[covered.clone(), other.clone()]).await.unwrap();

        let store = Arc::new(ScanCountingStore {
            inner,
            scans: AtomicUsize::new(0),
        });

        let retriever = HybridRetriever::new(
            store.clone(),
            Arc::new(FixedEmbedder { vector: vec![1.0, 0.0] }),
        )
        .with_config(RetrievalConfig {
            k_vector: 2,
            k_keyword: 20,
            timeout: None,
        });

        let results = retriever.retrieve("linaje completo").await.unwrap();

        // no scan ran, and the vector ranking is untouched
        assert_eq!(store.scans.load(Ordering::SeqCst), 0);
        let ids: Vec<_> = results.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![covered.id, other.id]);
    }

    #[tokio::test]
    async fn test_output_is_bounded() {
        // 3 near fillers win the vector top-3; 50 far documents all carry
        // the literal term, far more than k_keyword allows through
        let mut docs: Vec<Document> = (0..3)
            .map(|i| doc("a.srt", &format!("relleno cercano {}", i), i, vec![1.0, 0.0]))
            .collect();
        docs.extend(
            (0..50).map(|i| doc("b.srt", &format!("contiene misterio {}", i), i, vec![0.0, 1.0])),
        );
        let store = seeded_store(&docs).await;
        let retriever = retriever(store, 3, 4);

        let results = retriever.retrieve("misterio").await.unwrap();
        assert_eq!(results.len(), 3 + 4);
    }

    #[tokio::test]
    async fn test_zero_match_documents_are_dropped() {
        let docs = vec![
            doc("a.srt", "primero", 0, vec![1.0, 0.0]),
            doc("a.srt", "segundo", 1, vec![1.0, 0.0]),
        ];
        let store = seeded_store(&docs).await;
        let retriever = retriever(store, 1, 10);

        // "segundo" is missing from the single vector result; only the
        // document containing it may join, never zero-score filler
        let results = retriever.retrieve("segundo").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "segundo");
        assert_eq!(results[1].text, "primero");
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_result() {
        let store = seeded_store(&[]).await;
        let retriever = retriever(store, 5, 5);
        let results = retriever.retrieve("cualquier cosa").await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_merge_priority_invariant() {
        let shared = doc("a.srt", "compartido", 0, vec![]);
        let kw_only = doc("a.srt", "solo keyword", 1, vec![]);
        let vec_only = doc("a.srt", "solo vector", 2, vec![]);

        let merged = merge_unique(
            vec![kw_only.clone(), shared.clone()],
            vec![shared.clone(), vec_only.clone()],
        );

        // the shared document keeps its keyword rank, not its vector rank
        let ids: Vec<_> = merged.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![kw_only.id, shared.id, vec_only.id]);
    }

    #[test]
    fn test_merge_distinguishes_identical_text() {
        // same text, different identity: both survive the merge
        let a = doc("a.srt", "texto idéntico", 0, vec![]);
        let b = doc("a.srt", "texto idéntico", 1, vec![]);

        let merged = merge_unique(vec![a.clone()], vec![b.clone()]);
        assert_eq!(merged.len(), 2);
    }
}
