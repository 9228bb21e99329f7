// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The audit stage: builds an [`AuditRecord`], optionally runs PII
//! detection over enriched chunks, appends the record to a JSONL trail,
//! and — if a narrative LLM is configured — synthesizes and optionally
//! persists a narrative summary. Grounded in
//! `original_source/rag_framework/steps/step_05_audit.py`'s `execute`.

use crate::audit::{narrative, pii};
use crate::config::AuditConfig;
use crate::llm_client::LlmClient;
use crate::rate_limit;
use ingest_domain::entities::AuditRecord;
use ingest_domain::services::{Stage, StageError};
use ingest_domain::{Blackboard, BlackboardKey, IngestError};
use std::io::Write;

pub struct AuditStage {
    config: AuditConfig,
    narrative_client: Option<LlmClient>,
}

impl AuditStage {
    pub fn new(config: AuditConfig, narrative_client: Option<LlmClient>) -> Self {
        Self { config, narrative_client }
    }

    fn append_log(&self, record: &AuditRecord) -> Result<(), IngestError> {
        if let Some(parent) = self.config.audit_log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&self.config.audit_log_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Stage for AuditStage {
    fn name(&self) -> &str {
        "audit"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if self.config.narrative.enabled && self.narrative_client.is_none() {
            return Err(IngestError::configuration(
                "audit narrative is enabled but no LLM provider/model was resolved",
            ));
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let documents_processed = board.extracted_documents.as_ref().map(|d| d.len()).unwrap_or(0) as u64;
        let enriched = board.enriched_chunks.clone().unwrap_or_default();
        let chunks_created = enriched.len() as u64;

        let mut record = AuditRecord::new("document_ingestion_pipeline", documents_processed, chunks_created);
        let files_processed: Vec<String> = board
            .extracted_documents
            .as_ref()
            .map(|docs| docs.iter().map(|d| d.file_path.display().to_string()).collect())
            .unwrap_or_default();
        record
            .metadata
            .insert("files_processed".to_string(), serde_json::json!(files_processed));

        if self.config.pii_detection_enabled && !enriched.is_empty() {
            let report = pii::detect_pii(enriched.iter().map(|c| c.chunk.text.as_str()));
            if report.total_pii_found > 0 {
                tracing::warn!(
                    total = report.total_pii_found,
                    chunks_with_pii = report.chunks_with_pii_count(),
                    "PII detected during audit scan"
                );
            }
            record = record.with_pii_detection(report);
        }

        self.append_log(&record).map_err(|e| StageError::recoverable(self.name(), e))?;

        if let Some(client) = &self.narrative_client {
            let prompt = narrative::render_prompt(&self.config.narrative.template, &record);
            match rate_limit::with_retry(&self.config.narrative.rate_limit, || {
                let client = client.clone();
                let prompt = prompt.clone();
                async move { client.complete(&prompt).await }
            })
            .await
            {
                Ok(summary) => {
                    record = record.with_llm_summary(summary.clone());
                    if self.config.narrative.persist_format.is_some() {
                        if let Err(e) = narrative::persist(&self.config.narrative, &record, &summary) {
                            tracing::warn!(error = %e, "failed to persist audit narrative summary");
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "audit narrative synthesis failed, continuing without summary"),
            }
        }

        tracing::info!(documents_processed, chunks_created, "audit stage complete");
        board.audit_record = Some(record);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_domain::entities::{Chunk, Document, EnrichedChunk};
    use ingest_domain::value_objects::{ChunkingStrategy, Sensitivity};
    use std::collections::BTreeSet;

    fn enriched(text: &str) -> EnrichedChunk {
        let chunk = Chunk::new(text.to_string(), "doc.txt", 0, 1, ChunkingStrategy::Fixed);
        EnrichedChunk::from_chunk(chunk, Sensitivity::Public, "other", BTreeSet::new())
    }

    #[tokio::test]
    async fn writes_audit_record_and_detects_pii() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AuditConfig::default();
        config.audit_log_path = dir.path().join("trail.jsonl");
        let stage = AuditStage::new(config, None);

        let mut board = Blackboard::new();
        board.extracted_documents = Some(vec![Document::new(
            "doc.txt".into(),
            "raw".to_string(),
            "clean".to_string(),
            "plain_text",
            1.0,
        )]);
        board.enriched_chunks = Some(vec![enriched("contact me at a@b.com")]);

        let board = stage.execute(board).await.unwrap();
        let record = board.audit_record.unwrap();
        assert_eq!(record.documents_processed, 1);
        assert_eq!(record.chunks_created, 1);
        assert!(record.pii_detection.unwrap().total_pii_found >= 1);

        let logged = std::fs::read_to_string(dir.path().join("trail.jsonl")).unwrap();
        assert_eq!(logged.lines().count(), 1);
    }

    #[tokio::test]
    async fn rejects_enabled_narrative_without_client() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AuditConfig::default();
        config.audit_log_path = dir.path().join("trail.jsonl");
        config.narrative.enabled = true;
        let stage = AuditStage::new(config, None);
        assert!(stage.validate_config().is_err());
    }
}
