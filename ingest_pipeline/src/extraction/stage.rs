// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The extraction stage: runs `FallbackManager` over every monitored file
//! with up to `max_workers` in flight at once, cleans the winning
//! text, and fills `extracted_documents` on the blackboard. Per-file
//! outcomes (for `FileLifecycle`) go to the side-channel `OutcomeLog`;
//! session metrics are written as a JSON summary on completion.

use crate::config::ExtractionConfig;
use crate::extraction::cleaning;
use crate::extraction::fallback_manager::FallbackManager;
use crate::extraction::metrics::ExtractionMetrics;
use crate::extraction::outcome_log::OutcomeLog;
use ingest_domain::entities::Document;
use ingest_domain::services::{Stage, StageError};
use ingest_domain::{Blackboard, BlackboardKey, IngestError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct ExtractionStage {
    config: ExtractionConfig,
    manager: Arc<FallbackManager>,
    outcome_log: OutcomeLog,
    metrics_output_path: Option<PathBuf>,
}

impl ExtractionStage {
    pub fn new(config: ExtractionConfig, outcome_log: OutcomeLog, metrics_output_path: Option<PathBuf>) -> Result<Self, IngestError> {
        let manager = Arc::new(FallbackManager::new(&config)?);
        Ok(Self { config, manager, outcome_log, metrics_output_path })
    }
}

#[async_trait::async_trait]
impl Stage for ExtractionStage {
    fn name(&self) -> &str {
        "extraction"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if self.config.min_confidence < 0.0 || self.config.min_confidence > 1.0 {
            return Err(IngestError::validation("min_confidence", "must be between 0.0 and 1.0"));
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let files = Blackboard::require(&board.monitored_files, BlackboardKey::MonitoredFiles)
            .map_err(|e| StageError::fatal(self.name(), e))?
            .clone();

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut tasks = JoinSet::new();
        for path in files {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore is never closed");
            let manager = self.manager.clone();
            let cleaning_config = self.config.cleaning.clone();
            let min_text_length = self.config.min_text_length;
            let min_confidence = self.config.min_confidence;
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let input_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                let (result, attempts) = manager.extract(&path, min_text_length, min_confidence);
                (path, input_bytes, result, attempts, cleaning_config)
            });
        }

        let mut documents = Vec::new();
        let mut metrics = ExtractionMetrics::default();
        while let Some(joined) = tasks.join_next().await {
            let (path, input_bytes, result, attempts, cleaning_config) =
                joined.map_err(|e| StageError::fatal(self.name(), IngestError::Internal(format!("extraction task panicked: {e}"))))?;

            for attempt in &attempts {
                metrics.record_attempt(&attempt.extractor_name, attempt.outcome == "validated", attempt.elapsed_seconds);
            }

            match result {
                Ok(extraction_result) => {
                    let cleaned = cleaning::clean(&extraction_result.text, &cleaning_config);
                    metrics.record_document(input_bytes, cleaned.chars().count() as u64, true);
                    self.outcome_log.record_success(path.clone());
                    let mut document = Document::new(
                        path,
                        extraction_result.text.clone(),
                        cleaned,
                        extraction_result.extractor_name.clone(),
                        extraction_result.confidence_score,
                    );
                    document.metadata = extraction_result.metadata;
                    documents.push(document);
                }
                Err(err) => {
                    metrics.record_document(input_bytes, 0, false);
                    self.outcome_log.record_failure(path, err.to_string());
                }
            }
        }

        if let Some(output_path) = &self.metrics_output_path {
            if let Ok(json) = metrics.to_json() {
                if let Some(parent) = output_path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                let _ = std::fs::write(output_path, json);
            }
        }

        board.extracted_documents = Some(documents);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_plain_text_files_and_fills_documents() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("note.txt");
        std::fs::write(&file_path, "hello from the extraction stage").unwrap();

        let config = ExtractionConfig::default();
        let stage = ExtractionStage::new(config, OutcomeLog::new(), None).unwrap();
        let mut board = Blackboard::new();
        board.monitored_files = Some(vec![file_path]);

        let board = stage.execute(board).await.unwrap();
        let documents = board.extracted_documents.unwrap();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].text.contains("hello"));
    }

    #[tokio::test]
    async fn records_failure_outcome_for_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing_path = dir.path().join("missing.txt");

        let config = ExtractionConfig::default();
        let outcome_log = OutcomeLog::new();
        let stage = ExtractionStage::new(config, outcome_log.clone(), None).unwrap();
        let mut board = Blackboard::new();
        board.monitored_files = Some(vec![missing_path]);

        let board = stage.execute(board).await.unwrap();
        assert_eq!(board.extracted_documents.unwrap().len(), 0);
        let outcomes = outcome_log.snapshot();
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].succeeded);
    }
}
