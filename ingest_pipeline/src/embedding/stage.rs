// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The embedding stage: truncates each chunk's text to
//! `max_text_length`, splits the batch into cache hits and misses, dispatches
//! the misses to the configured provider in groups of `batch_size` under the
//! shared rate-limit wrapper, writes generated vectors back into the cache,
//! and fills `embedded_chunks` — rejecting the run if providers return
//! non-uniform dimensionality. Grounded in
//! `original_source/rag_framework/steps/step_06_embedding.py`'s
//! `execute`/`_generate_embeddings_batch`.

use crate::config::EmbeddingConfig;
use crate::embedding::cache::EmbeddingCache;
use crate::rate_limit;
use ingest_domain::entities::{self, EmbeddedChunk, EnrichedChunk};
use ingest_domain::services::{EmbeddingProvider, Stage, StageError};
use ingest_domain::{Blackboard, BlackboardKey, IngestError};
use std::sync::Arc;

pub struct EmbeddingStage {
    config: EmbeddingConfig,
    provider: Arc<dyn EmbeddingProvider>,
    cache: Option<EmbeddingCache>,
}

impl EmbeddingStage {
    pub fn new(config: EmbeddingConfig, provider: Arc<dyn EmbeddingProvider>, cache_enabled: bool) -> Result<Self, IngestError> {
        let cache = if cache_enabled {
            let cache = EmbeddingCache::new(config.cache_dir.clone(), config.ttl_days);
            cache.prepare()?;
            Some(cache)
        } else {
            None
        };
        Ok(Self { config, provider, cache })
    }

    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.config.max_text_length) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        }
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
        let mut result: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut to_generate: Vec<(usize, String)> = Vec::new();
        let mut cache_hits = 0usize;

        if let Some(cache) = &self.cache {
            for (idx, text) in texts.iter().enumerate() {
                match cache.get(text, self.provider.provider_name(), self.provider.model_name()) {
                    Some(embedding) => {
                        result[idx] = Some(embedding);
                        cache_hits += 1;
                    }
                    None => to_generate.push((idx, text.clone())),
                }
            }
            if !texts.is_empty() {
                let hit_rate = (cache_hits as f64 / texts.len() as f64) * 100.0;
                tracing::info!(cache_hits, total = texts.len(), hit_rate, "embedding cache hit rate");
            }
        } else {
            to_generate = texts.iter().cloned().enumerate().collect();
        }

        if to_generate.is_empty() {
            return Ok(result.into_iter().map(|v| v.expect("every index filled from cache")).collect());
        }

        for chunk in to_generate.chunks(self.config.batch_size.max(1)) {
            let chunk_texts: Vec<String> = chunk.iter().map(|(_, t)| t.clone()).collect();
            let embeddings = rate_limit::with_retry(&self.config.rate_limit, || {
                let provider = self.provider.clone();
                let texts = chunk_texts.clone();
                async move { provider.embed_batch(&texts).await }
            })
            .await?;
            if embeddings.len() != chunk.len() {
                return Err(IngestError::EmbeddingProvider(format!(
                    "provider returned {} embeddings for a batch of {}",
                    embeddings.len(),
                    chunk.len()
                )));
            }
            for ((idx, text), embedding) in chunk.iter().zip(embeddings.into_iter()) {
                if let Some(cache) = &self.cache {
                    cache.put(text, self.provider.provider_name(), self.provider.model_name(), embedding.clone());
                }
                result[*idx] = Some(embedding);
            }
        }

        Ok(result.into_iter().map(|v| v.expect("every index filled after generation")).collect())
    }
}

#[async_trait::async_trait]
impl Stage for EmbeddingStage {
    fn name(&self) -> &str {
        "embedding"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if self.config.dimensions != self.provider.dimensions() {
            return Err(IngestError::configuration(format!(
                "embedding config declares {} dimensions but provider '{}' produces {}",
                self.config.dimensions,
                self.provider.provider_name(),
                self.provider.dimensions()
            )));
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let enriched: Vec<EnrichedChunk> = Blackboard::require(&board.enriched_chunks, BlackboardKey::EnrichedChunks)
            .map_err(|e| StageError::fatal(self.name(), e))?
            .clone();

        if enriched.is_empty() {
            tracing::warn!("no chunks to embed");
            board.embedded_chunks = Some(Vec::new());
            return Ok(board);
        }

        let texts: Vec<String> = enriched.iter().map(|c| self.truncate(&c.chunk.text).to_string()).collect();
        let embeddings = self
            .embed_texts(&texts)
            .await
            .map_err(|e| StageError::recoverable(self.name(), e))?;

        let embedded: Vec<EmbeddedChunk> = enriched
            .into_iter()
            .zip(embeddings.into_iter())
            .map(|(chunk, embedding)| EmbeddedChunk::new(chunk, embedding, self.provider.provider_name(), self.provider.model_name()))
            .collect();

        if !entities::embedded_chunk::all_share_dimensionality(&embedded) {
            return Err(StageError::fatal(
                self.name(),
                IngestError::EmbeddingProvider("embedded chunks do not share one embedding dimensionality".to_string()),
            ));
        }

        tracing::info!(
            count = embedded.len(),
            dimensions = embedded.first().map(|c| c.embedding_dimensions).unwrap_or(0),
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            "embedding stage complete"
        );

        board.embedded_chunks = Some(embedded);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::simulated::SimulatedEmbeddingProvider;
    use ingest_domain::entities::Chunk;
    use ingest_domain::value_objects::{ChunkingStrategy, Sensitivity};
    use std::collections::BTreeSet;

    fn enriched(text: &str) -> EnrichedChunk {
        let chunk = Chunk::new(text.to_string(), "doc.txt", 0, 1, ChunkingStrategy::Fixed);
        EnrichedChunk::from_chunk(chunk, Sensitivity::Public, "other", BTreeSet::new())
    }

    fn config(cache_dir: &std::path::Path) -> EmbeddingConfig {
        let mut config = EmbeddingConfig::default();
        config.dimensions = 8;
        config.cache_dir = cache_dir.to_path_buf();
        config.batch_size = 2;
        config
    }

    #[tokio::test]
    async fn fills_embedded_chunks_with_uniform_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(SimulatedEmbeddingProvider::new("simulated-384", 8));
        let stage = EmbeddingStage::new(config(dir.path()), provider, true).unwrap();
        stage.validate_config().unwrap();

        let mut board = Blackboard::new();
        board.enriched_chunks = Some(vec![enriched("hello"), enriched("world"), enriched("third")]);

        let board = stage.execute(board).await.unwrap();
        let embedded = board.embedded_chunks.unwrap();
        assert_eq!(embedded.len(), 3);
        assert!(entities::embedded_chunk::all_share_dimensionality(&embedded));
        assert_eq!(embedded[0].embedding_dimensions, 8);
    }

    #[tokio::test]
    async fn repeated_text_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(SimulatedEmbeddingProvider::new("simulated-384", 8));
        let stage = EmbeddingStage::new(config(dir.path()), provider, true).unwrap();

        let mut board = Blackboard::new();
        board.enriched_chunks = Some(vec![enriched("repeat"), enriched("repeat")]);
        let board = stage.execute(board).await.unwrap();
        let embedded = board.embedded_chunks.unwrap();
        assert_eq!(embedded[0].embedding, embedded[1].embedding);
    }

    #[tokio::test]
    async fn rejects_mismatched_dimensions_at_validation() {
        let dir = tempfile::tempdir().unwrap();
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(SimulatedEmbeddingProvider::new("simulated-384", 16));
        let stage = EmbeddingStage::new(config(dir.path()), provider, false).unwrap();
        assert!(stage.validate_config().is_err());
    }
}
