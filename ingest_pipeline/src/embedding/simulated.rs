// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Simulated embedding provider: the original step's
//! `_generate_embeddings_simulated` fallback, used both when no real
//! provider/model is configured and directly by name for deterministic
//! tests. Seeds a PRNG from the text's hash rather than calling any
//! provider, so repeated runs over the same text produce the same vector —
//! required for embedding-cache hit-rate tests.

use ingest_domain::services::EmbeddingProvider;
use ingest_domain::IngestError;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct SimulatedEmbeddingProvider {
    model: String,
    dimensions: usize,
}

impl SimulatedEmbeddingProvider {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self { model: model.into(), dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..self.dimensions).map(|_| rng.random_range(-1.0..1.0)).collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for SimulatedEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "simulated"
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
    async fn same_text_yields_same_vector() {
        let provider = SimulatedEmbeddingProvider::new("simulated-384", 8);
        let a = provider.embed_batch(&["repeat me".to_string()]).await.unwrap();
        let b = provider.embed_batch(&["repeat me".to_string()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn dimensions_match_config() {
        let provider = SimulatedEmbeddingProvider::new("simulated-384", 384);
        let out = provider.embed_batch(&["x".to_string()]).await.unwrap();
        assert_eq!(out[0].len(), 384);
    }
}
