//! Deterministic hash-based embeddings.
//!
//! Projects each whitespace token into a fixed-dimension vector through a
//! seeded 64-bit hash and normalizes the result. Equal inputs always produce
//! equal vectors, which keeps retrieval reproducible without any network
//! access. Semantic quality is limited; with this provider the keyword
//! fallback carries most of the recall.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Offline embedder producing deterministic unit vectors.
pub struct DeterministicEmbedder {
    dimensions: usize,
}

impl DeterministicEmbedder {
    /// Create a deterministic embedder with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimensions];

        for (position, token) in text.to_lowercase().split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let h = hasher.finish();

            let idx = (h as usize) % self.dimensions;
            let weight = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            // small positional term so token order still perturbs the vector
            v[idx] += weight + (position % 3) as f32 * 0.01;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for DeterministicEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_equal_inputs_give_equal_vectors() {
        let embedder = DeterministicEmbedder::new(128);
        let a = embedder.embed("el linaje ra y las cuatro razas").await.unwrap();
        let b = embedder.embed("el linaje ra y las cuatro razas").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_inputs_diverge() {
        let embedder = DeterministicEmbedder::new(128);
        let a = embedder.embed("meditación sobre el amor").await.unwrap();
        let b = embedder.embed("historia de los masones").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_vectors_are_unit_length() {
        let embedder = DeterministicEmbedder::new(64);
        let v = embedder.embed("hola mundo").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
        assert_eq!(v.len(), 64);
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = DeterministicEmbedder::new(32);
        let single = embedder.embed("texto de prueba").await.unwrap();
        let batch = embedder
            .embed_batch(&["texto de prueba".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0], single);
    }
}
