// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The chunking stage: builds the one chunker named by `ChunkingConfig.strategy`,
//! runs it over every `extracted_documents` entry, then applies a
//! post-strategy validation pass — chunks shorter than
//! `min_chunk_size` or longer than `max_chunk_size` are dropped, and empty
//! chunks are dropped when `drop_empty_chunks` is set — logging how many
//! were rejected before filling `chunks`.

use crate::chunking::{FixedChunker, LlmGuidedChunker, RecursiveChunker, SemanticChunker};
use crate::config::ChunkingConfig;
use crate::llm_client::LlmClient;
use ingest_domain::entities::Chunk;
use ingest_domain::services::{Chunker, EmbeddingProvider, Stage, StageError};
use ingest_domain::{value_objects::ChunkingStrategy, Blackboard, BlackboardKey, IngestError};
use std::sync::Arc;

pub struct ChunkingStage {
    config: ChunkingConfig,
    chunker: Arc<dyn Chunker>,
}

impl ChunkingStage {
    /// `llm_client` feeds llm-guided chunking's boundary analysis calls;
    /// `embedding_provider` feeds semantic chunking's sentence embeddings.
    /// Either may be `None` when the active strategy doesn't need it, in
    /// which case that strategy falls back to recursive chunking per-call.
    pub fn new(config: ChunkingConfig, llm_client: Option<LlmClient>, embedding_provider: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        let chunker: Arc<dyn Chunker> = match config.strategy {
            ChunkingStrategy::Fixed => Arc::new(FixedChunker {
                chunk_size: config.chunk_size,
                overlap: config.overlap,
            }),
            ChunkingStrategy::Recursive => Arc::new(RecursiveChunker {
                chunk_size: config.chunk_size,
                chunk_overlap: config.overlap,
                separators: config.separators.clone(),
            }),
            ChunkingStrategy::Semantic => Arc::new(SemanticChunker {
                embedding_provider,
                similarity_threshold: config.similarity_threshold,
                min_chunk_size: config.min_chunk_size,
                max_chunk_size: config.max_chunk_size,
                fallback_separators: config.separators.clone(),
                fallback_chunk_size: config.chunk_size,
                fallback_overlap: config.overlap,
            }),
            ChunkingStrategy::LlmGuided => Arc::new(LlmGuidedChunker {
                llm_client,
                rate_limit: config.rate_limit.clone(),
                prompt_template: config.llm_prompt_template.clone(),
                llm_single_call_budget: config.llm_single_call_budget,
                recursive_fallback: RecursiveChunker {
                    chunk_size: config.chunk_size,
                    chunk_overlap: config.overlap,
                    separators: config.separators.clone(),
                },
            }),
        };
        Self { config, chunker }
    }

    fn is_valid(&self, chunk: &Chunk) -> bool {
        if self.config.drop_empty_chunks && chunk.text.trim().is_empty() {
            return false;
        }
        let len = chunk.text.chars().count();
        len >= self.config.min_chunk_size && len <= self.config.max_chunk_size
    }
}

#[async_trait::async_trait]
impl Stage for ChunkingStage {
    fn name(&self) -> &str {
        "chunking"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if self.config.overlap >= self.config.chunk_size {
            return Err(IngestError::validation("overlap", "must be smaller than chunk_size"));
        }
        if self.config.min_chunk_size > self.config.max_chunk_size {
            return Err(IngestError::validation("min_chunk_size", "must be <= max_chunk_size"));
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let documents = Blackboard::require(&board.extracted_documents, BlackboardKey::ExtractedDocuments)
            .map_err(|e| StageError::fatal(self.name(), e))?
            .clone();

        let mut accepted = Vec::new();
        let mut rejected = 0usize;
        for document in &documents {
            let chunks = self
                .chunker
                .chunk(document)
                .await
                .map_err(|e| StageError::recoverable(self.name(), e))?;
            for chunk in chunks {
                if self.is_valid(&chunk) {
                    accepted.push(chunk);
                } else {
                    rejected += 1;
                }
            }
        }

        if rejected > 0 {
            tracing::info!(strategy = self.chunker.strategy_name(), rejected, accepted = accepted.len(), "chunking stage dropped out-of-range or empty chunks");
        }

        board.chunks = Some(accepted);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_domain::entities::Document;
    use std::path::PathBuf;

    fn document(text: &str) -> Document {
        Document::new(PathBuf::from("doc.txt"), text.to_string(), text.to_string(), "plain_text".to_string(), 1.0)
    }

    #[tokio::test]
    async fn fills_chunks_using_configured_strategy() {
        let config = ChunkingConfig {
            strategy: ChunkingStrategy::Fixed,
            chunk_size: 10,
            overlap: 2,
            min_chunk_size: 1,
            max_chunk_size: 1000,
            ..ChunkingConfig::default()
        };
        let stage = ChunkingStage::new(config, None, None);
        let mut board = Blackboard::new();
        board.extracted_documents = Some(vec![document(&"a".repeat(30))]);

        let board = stage.execute(board).await.unwrap();
        let chunks = board.chunks.unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.chunking_strategy == ChunkingStrategy::Fixed));
    }

    #[tokio::test]
    async fn drops_chunks_outside_size_bounds() {
        let config = ChunkingConfig {
            strategy: ChunkingStrategy::Fixed,
            chunk_size: 5,
            overlap: 0,
            min_chunk_size: 10,
            max_chunk_size: 1000,
            ..ChunkingConfig::default()
        };
        let stage = ChunkingStage::new(config, None, None);
        let mut board = Blackboard::new();
        board.extracted_documents = Some(vec![document("short")]);

        let board = stage.execute(board).await.unwrap();
        assert!(board.chunks.unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_size_bounds_at_construction() {
        let config = ChunkingConfig {
            min_chunk_size: 100,
            max_chunk_size: 10,
            ..ChunkingConfig::default()
        };
        let stage = ChunkingStage::new(config, None, None);
        assert!(stage.validate_config().is_err());
    }
}
