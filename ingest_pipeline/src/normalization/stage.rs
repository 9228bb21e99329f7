// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The normalization stage: L2-normalizes each embedding, validates
//! embedding and metadata, rewrites chunk text through the configured
//! Unicode/accent/quote transforms, and whitelists metadata keys. Grounded
//! in `original_source/rag_framework/steps/step_07_normalization.py`'s
//! `execute`/`_validate_embedding`/`_validate_metadata_fields`/
//! `_normalize_metadata`.

use crate::config::NormalizationConfig;
use crate::normalization::transform;
use ingest_domain::entities::{EmbeddedChunk, NormalizedChunk};
use ingest_domain::services::{Stage, StageError};
use ingest_domain::{Blackboard, BlackboardKey, IngestError};
use std::collections::BTreeMap;

pub struct NormalizationStage {
    config: NormalizationConfig,
}

impl NormalizationStage {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    fn validate_embedding(embedding: &[f32]) -> Result<(), String> {
        if embedding.is_empty() {
            return Err("embedding is empty".to_string());
        }
        if embedding.iter().any(|v| v.is_nan()) {
            return Err("embedding contains NaN".to_string());
        }
        if embedding.iter().any(|v| v.is_infinite()) {
            return Err("embedding contains an infinite value".to_string());
        }
        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Err("embedding has zero norm".to_string());
        }
        Ok(())
    }

    fn validate_metadata_fields(chunk: &EmbeddedChunk) -> Result<(), String> {
        if chunk.enriched.chunk.text.trim().is_empty() {
            return Err("'text' field is empty".to_string());
        }
        if chunk.enriched.chunk.source_file.trim().is_empty() {
            return Err("'source_file' field is missing".to_string());
        }
        Ok(())
    }

    fn normalize_l2(embedding: &[f32]) -> Vec<f32> {
        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            embedding.to_vec()
        } else {
            embedding.iter().map(|v| v / norm).collect()
        }
    }

    fn normalize_text(&self, text: &str) -> String {
        let mut text = transform::apply_unicode_form(text, self.config.unicode_form.as_deref());
        if self.config.strip_accents {
            text = transform::strip_accents(&text);
        }
        if self.config.standardize_quotes {
            text = transform::standardize_quotes(&text);
        }
        text
    }

    fn build_metadata(&self, chunk: &EmbeddedChunk) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert("source_file".to_string(), chunk.enriched.chunk.source_file.clone());
        metadata.insert("chunk_index".to_string(), chunk.enriched.chunk.chunk_index.to_string());
        metadata.insert("content_hash".to_string(), chunk.enriched.content_hash.as_str().to_string());
        metadata.insert("sensitivity".to_string(), chunk.enriched.sensitivity.as_str().to_string());
        metadata.insert("document_type".to_string(), chunk.enriched.document_type.clone());
        metadata.insert(
            "regulatory_tags".to_string(),
            chunk.enriched.regulatory_tags.iter().cloned().collect::<Vec<_>>().join(","),
        );
        metadata.insert("processed_at".to_string(), chunk.enriched.processed_at.to_rfc3339());

        if self.config.drop_null_metadata {
            metadata.retain(|_, v| !v.is_empty());
        }
        if !self.config.metadata_whitelist.is_empty() {
            let whitelist = &self.config.metadata_whitelist;
            metadata.retain(|k, _| whitelist.contains(k));
        }
        metadata
    }
}

#[async_trait::async_trait]
impl Stage for NormalizationStage {
    fn name(&self) -> &str {
        "normalization"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if let Some(form) = &self.config.unicode_form {
            if !matches!(form.as_str(), "NFC" | "NFKC" | "NFD" | "NFKD") {
                return Err(IngestError::configuration(format!("unknown unicode form '{form}'")));
            }
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let embedded: Vec<EmbeddedChunk> = Blackboard::require(&board.embedded_chunks, BlackboardKey::EmbeddedChunks)
            .map_err(|e| StageError::fatal(self.name(), e))?
            .clone();

        if embedded.is_empty() {
            tracing::warn!("no chunks to normalize");
            board.normalized_chunks = Some(Vec::new());
            return Ok(board);
        }

        let mut normalized_chunks = Vec::with_capacity(embedded.len());
        let mut validation_errors: Vec<String> = Vec::new();

        for mut chunk in embedded {
            let mut errors = Vec::new();
            if let Err(e) = Self::validate_embedding(&chunk.embedding) {
                errors.push(e);
            }
            if let Err(e) = Self::validate_metadata_fields(&chunk) {
                errors.push(e);
            }
            if !errors.is_empty() {
                validation_errors.push(format!("chunk {}: {}", chunk.enriched.chunk.chunk_index, errors.join("; ")));
                if self.config.skip_invalid {
                    continue;
                }
            }

            chunk.enriched.chunk.text = self.normalize_text(&chunk.enriched.chunk.text);
            chunk.embedding = Self::normalize_l2(&chunk.embedding);

            let metadata = self.build_metadata(&chunk);
            normalized_chunks.push(NormalizedChunk::new(chunk, metadata));
        }

        if !validation_errors.is_empty() {
            tracing::warn!(count = validation_errors.len(), "normalization validation errors");
            for error in validation_errors.iter().take(5) {
                tracing::warn!("{error}");
            }
        }

        tracing::info!(count = normalized_chunks.len(), "normalization stage complete");
        board.normalized_chunks = Some(normalized_chunks);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_domain::entities::Chunk;
    use ingest_domain::value_objects::{ChunkingStrategy, Sensitivity};
    use ingest_domain::entities::EnrichedChunk;
    use std::collections::BTreeSet;

    fn embedded(text: &str, embedding: Vec<f32>) -> EmbeddedChunk {
        let chunk = Chunk::new(text.to_string(), "doc.txt", 0, 1, ChunkingStrategy::Fixed);
        let enriched = EnrichedChunk::from_chunk(chunk, Sensitivity::Public, "other", BTreeSet::new());
        EmbeddedChunk::new(enriched, embedding, "simulated", "simulated-384")
    }

    #[tokio::test]
    async fn normalizes_embedding_to_unit_norm() {
        let stage = NormalizationStage::new(NormalizationConfig::default());
        let mut board = Blackboard::new();
        board.embedded_chunks = Some(vec![embedded("hello", vec![3.0, 4.0])]);
        let board = stage.execute(board).await.unwrap();
        let normalized = board.normalized_chunks.unwrap();
        assert_eq!(normalized.len(), 1);
        assert!(normalized[0].embedding_is_unit_norm());
    }

    #[tokio::test]
    async fn skips_invalid_embedding_when_configured() {
        let stage = NormalizationStage::new(NormalizationConfig::default());
        let mut board = Blackboard::new();
        board.embedded_chunks = Some(vec![embedded("hello", vec![0.0, 0.0])]);
        let board = stage.execute(board).await.unwrap();
        assert!(board.normalized_chunks.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_whitelist_filters_keys() {
        let mut config = NormalizationConfig::default();
        config.metadata_whitelist = vec!["source_file".to_string()];
        let stage = NormalizationStage::new(config);
        let mut board = Blackboard::new();
        board.embedded_chunks = Some(vec![embedded("hello", vec![1.0, 0.0])]);
        let board = stage.execute(board).await.unwrap();
        let normalized = board.normalized_chunks.unwrap();
        assert_eq!(normalized[0].metadata.len(), 1);
        assert!(normalized[0].metadata.contains_key("source_file"));
    }

    proptest::proptest! {
        /// For any non-zero input embedding, `|‖N.embedding‖₂ − 1| < 1e-6`
        /// after L2 normalization, regardless of dimensionality or magnitude.
        #[test]
        fn l2_normalize_yields_unit_norm_for_any_nonzero_vector(
            values in proptest::collection::vec(-1000.0f32..1000.0f32, 1..32)
        ) {
            proptest::prop_assume!(values.iter().any(|v| *v != 0.0));
            let normalized = NormalizationStage::normalize_l2(&values);
            let norm: f32 = normalized.iter().map(|v| v * v).sum::<f32>().sqrt();
            proptest::prop_assert!((norm - 1.0).abs() < 1e-3);
        }

        /// A zero vector passes through unchanged.
        #[test]
        fn l2_normalize_leaves_zero_vector_unchanged(len in 1usize..16) {
            let zeros = vec![0.0f32; len];
            proptest::prop_assert_eq!(NormalizationStage::normalize_l2(&zeros), zeros);
        }
    }
}
