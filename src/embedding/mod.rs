//! Embedding generation for semantic search and retrieval.
//!
//! The provider is selected once at startup from configuration. A failed
//! provider is a hard error for the query that hit it; there is no silent
//! fallback between providers at runtime.

mod fallback;
mod openai;

pub use fallback::DeterministicEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Build the configured embedder.
pub fn create_embedder(settings: &EmbeddingSettings) -> Arc<dyn Embedder> {
    match settings.provider {
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
        )),
        EmbeddingProvider::Deterministic => {
            Arc::new(DeterministicEmbedder::new(settings.dimensions as usize))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_embedder_respects_provider() {
        let settings = EmbeddingSettings {
            provider: EmbeddingProvider::Deterministic,
            model: String::new(),
            dimensions: 64,
        };
        let embedder = create_embedder(&settings);
        assert_eq!(embedder.dimensions(), 64);
    }
}
