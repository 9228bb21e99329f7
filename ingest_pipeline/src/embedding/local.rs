// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Placeholder provider for the `sentence-transformers` (local model)
//! embedding path. A real implementation would load a sentence-
//! transformer model and run inference on-device; this crate's dependency
//! stack carries no tensor/inference runtime, so — grounded in the pack's
//! own admission that local embedding support is not yet built
//! (`llmspell-rag/src/embeddings/local.rs`'s `LocalEmbedding`, explicitly
//! documented there as "a placeholder for future BGE-M3 and other local
//! model integrations using candle or ONNX runtime") — this provider
//! generates a deterministic, hash-derived unit vector per text instead of
//! loading a model.

use ingest_domain::services::EmbeddingProvider;
use ingest_domain::IngestError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct LocalEmbeddingProvider {
    model: String,
    dimensions: usize,
}

impl LocalEmbeddingProvider {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self { model: model.into(), dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let value = (((seed.wrapping_mul(i as u64 + 1)) % 2000) as f32 / 1000.0) - 1.0;
            embedding.push(value);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "sentence-transformers"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_and_unit_norm() {
        let provider = LocalEmbeddingProvider::new("bge-m3-placeholder", 16);
        let a = provider.embed_batch(&["hello".to_string()]).await.unwrap();
        let b = provider.embed_batch(&["hello".to_string()]).await.unwrap();
        assert_eq!(a, b);

        let norm: f32 = a[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn different_text_yields_different_embedding() {
        let provider = LocalEmbeddingProvider::new("bge-m3-placeholder", 16);
        let a = provider.embed_batch(&["hello".to_string()]).await.unwrap();
        let b = provider.embed_batch(&["goodbye".to_string()]).await.unwrap();
        assert_ne!(a, b);
    }
}
