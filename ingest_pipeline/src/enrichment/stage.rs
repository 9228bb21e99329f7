// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The enrichment stage: attaches compliance metadata to every chunk
//! — content hash, UTC timestamp, sensitivity, document type, regulatory
//! tags — reading `chunks` and writing `enriched_chunks`.

use crate::config::EnrichmentConfig;
use crate::enrichment::classifier::{classify_document_type, classify_sensitivity_by_keyword, extract_regulatory_tags, parse_llm_sensitivity};
use crate::llm_client::LlmClient;
use crate::rate_limit;
use ingest_domain::entities::EnrichedChunk;
use ingest_domain::services::{Stage, StageError};
use ingest_domain::{Blackboard, BlackboardKey, IngestError};

const DEFAULT_SENSITIVITY_PROMPT: &str = "Classify the sensitivity level of the following document.\n\
Reply with EXACTLY ONE of these words: public, interne, confidentiel, secret\n\n\
Criteria:\n\
- public: information accessible to anyone\n\
- interne: for internal company use only\n\
- confidentiel: sensitive information, restricted access\n\
- secret: highly sensitive information, very restricted access\n\n\
Document:\n{text}\n\nSensitivity level:";

pub struct EnrichmentStage {
    config: EnrichmentConfig,
    llm_client: Option<LlmClient>,
}

impl EnrichmentStage {
    pub fn new(config: EnrichmentConfig, llm_client: Option<LlmClient>) -> Self {
        Self { config, llm_client }
    }

    async fn classify_sensitivity(&self, text: &str) -> ingest_domain::value_objects::Sensitivity {
        if self.config.use_llm_sensitivity {
            if let Some(client) = &self.llm_client {
                let prompt = DEFAULT_SENSITIVITY_PROMPT.replace("{text}", &text.chars().take(1000).collect::<String>());
                let result = rate_limit::with_retry(&self.config.rate_limit, || {
                    let client = client.clone();
                    let prompt = prompt.clone();
                    async move { client.complete(&prompt).await }
                })
                .await;
                match result {
                    Ok(response) => return parse_llm_sensitivity(&response, self.config.default_sensitivity),
                    Err(err) => {
                        tracing::warn!(error = %err, "LLM sensitivity classification failed, falling back to keyword classifier");
                    }
                }
            }
        }
        classify_sensitivity_by_keyword(text, self.config.default_sensitivity)
    }
}

#[async_trait::async_trait]
impl Stage for EnrichmentStage {
    fn name(&self) -> &str {
        "enrichment"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if self.config.use_llm_sensitivity && (self.config.llm_provider.is_empty() || self.config.llm_model.is_empty()) {
            tracing::warn!("use_llm_sensitivity is set but llm_provider/llm_model are empty; will fall back to keyword classification at runtime");
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let chunks = Blackboard::require(&board.chunks, BlackboardKey::Chunks)
            .map_err(|e| StageError::fatal(self.name(), e))?
            .clone();

        let mut enriched = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let sensitivity = self.classify_sensitivity(&chunk.text).await;
            let document_type = classify_document_type(&chunk.source_file, &self.config.document_type_keywords);
            let regulatory_tags = extract_regulatory_tags(&chunk.text, &self.config.regulatory_keywords);
            enriched.push(EnrichedChunk::from_chunk(chunk, sensitivity, document_type, regulatory_tags));
        }

        board.enriched_chunks = Some(enriched);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_domain::entities::Chunk;
    use ingest_domain::value_objects::{ChunkingStrategy, Sensitivity};

    fn chunk(text: &str, source_file: &str) -> Chunk {
        Chunk::new(text.to_string(), source_file, 0, 1, ChunkingStrategy::Fixed)
    }

    #[tokio::test]
    async fn fills_enriched_chunks_with_keyword_classification() {
        let config = EnrichmentConfig::default();
        let stage = EnrichmentStage::new(config, None);
        let mut board = Blackboard::new();
        board.chunks = Some(vec![chunk("this is a secret memo", "contract_2024.pdf")]);

        let board = stage.execute(board).await.unwrap();
        let enriched = board.enriched_chunks.unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].sensitivity, Sensitivity::Confidentiel);
        assert_eq!(enriched[0].document_type, "contract");
        assert!(enriched[0].content_hash_is_consistent());
    }

    #[tokio::test]
    async fn tags_known_regulatory_frameworks() {
        let config = EnrichmentConfig::default();
        let stage = EnrichmentStage::new(config, None);
        let mut board = Blackboard::new();
        board.chunks = Some(vec![chunk("We comply with RGPD and ISO 27001.", "policy.txt")]);

        let board = stage.execute(board).await.unwrap();
        let enriched = board.enriched_chunks.unwrap();
        assert!(enriched[0].regulatory_tags.contains("RGPD"));
        assert!(enriched[0].regulatory_tags.contains("ISO27001"));
    }
}
