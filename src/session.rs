//! Session wiring for Consulta.
//!
//! A `Session` is constructed once per invocation and owns the long-lived
//! components: settings, prompts, the embedding provider and the vector
//! store. Retrieval and RAG objects borrow these per call and hold no state
//! of their own, so concurrent queries stay independent.

use crate::chunking::WindowChunker;
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{ConsultaError, Result};
use crate::rag::RagEngine;
use crate::retrieval::{HybridRetriever, RetrievalConfig};
use crate::subtitle;
use crate::vector_store::{Document, MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The owning context for one Consulta invocation.
pub struct Session {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Session {
    /// Create a session from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let prompts = Prompts::load(None, None)?;
        let embedder = create_embedder(&settings.embedding);

        let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "sqlite" => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
            "memory" => Arc::new(MemoryVectorStore::new()),
            other => {
                return Err(ConsultaError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };

        Ok(Self {
            settings,
            prompts,
            embedder,
            store,
        })
    }

    /// Create a session with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            store,
        }
    }

    /// Get a reference to the vector store.
    pub fn store(&self) -> Arc<dyn VectorStore> {
        self.store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build a hybrid retriever over this session's store and embedder.
    pub fn retriever(&self) -> HybridRetriever {
        HybridRetriever::new(self.store.clone(), self.embedder.clone())
            .with_config(RetrievalConfig::from(&self.settings.retrieval))
    }

    /// Build a RAG engine over this session's components.
    pub fn engine(&self) -> RagEngine {
        RagEngine::new(
            self.store.clone(),
            self.embedder.clone(),
            &self.settings.rag,
            RetrievalConfig::from(&self.settings.retrieval),
            self.prompts.clone(),
        )
    }

    /// Ingest every `.srt` file in a corpus directory: chunk, embed, index.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn ingest_corpus(&self, dir: &Path, force: bool) -> Result<IngestReport> {
        let files = subtitle::load_corpus(dir)?;
        if files.is_empty() {
            warn!("No .srt files found in {}", dir.display());
            return Ok(IngestReport::default());
        }

        let chunker = WindowChunker::new(&self.settings.chunking)?;
        let mut report = IngestReport::default();

        for file in &files {
            if !force && self.store.is_source_indexed(&file.name).await? {
                info!("Source {} already indexed, skipping", file.name);
                report.files_skipped += 1;
                continue;
            }

            let indexed = self.ingest_file(&chunker, &file.name, &file.text).await?;
            info!("Indexed {} chunks from {}", indexed, file.name);
            report.files_processed += 1;
            report.chunks_indexed += indexed;
        }

        Ok(report)
    }

    /// Ingest a single transcript body under a source name.
    async fn ingest_file(
        &self,
        chunker: &WindowChunker,
        source: &str,
        text: &str,
    ) -> Result<usize> {
        let chunks = chunker.chunk(text);
        if chunks.is_empty() {
            warn!("Source {} produced no chunks", source);
            return Ok(0);
        }

        // replace any previous documents for this source
        self.store.delete_by_source(source).await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Document::new(source.to_string(), chunk.content, chunk.index, embedding)
            })
            .collect();

        self.store.upsert_batch(&documents).await
    }
}

/// Result of a corpus ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Files chunked, embedded and indexed.
    pub files_processed: usize,
    /// Files skipped because they were already indexed.
    pub files_skipped: usize,
    /// Total chunks written to the store.
    pub chunks_indexed: usize,
}
