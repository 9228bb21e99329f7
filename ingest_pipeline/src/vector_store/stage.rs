// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The vector storage stage: opens the configured collection,
//! optionally deletes existing records for each source file present in the
//! batch, then upserts in groups of `batch_size`, logging and continuing
//! past per-batch failures. Grounded in
//! `original_source/rag_framework/steps/step_08_vector_storage.py`'s
//! `execute` (batch loop, delete-existing-by-filename, failure counting).

use crate::config::StorageConfig;
use ingest_domain::entities::NormalizedChunk;
use ingest_domain::services::{Stage, StageError, VectorRecord, VectorStore};
use ingest_domain::{Blackboard, BlackboardKey, IngestError};
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct StorageStage {
    config: StorageConfig,
    store: Arc<dyn VectorStore>,
}

impl StorageStage {
    pub fn new(config: StorageConfig, store: Arc<dyn VectorStore>) -> Self {
        Self { config, store }
    }

    fn assign_ids(chunks: &[NormalizedChunk]) -> Vec<String> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        chunks
            .iter()
            .map(|chunk| {
                let base = chunk.embedded.enriched.content_hash.as_str().to_string();
                if seen.insert(base.clone()) {
                    base
                } else {
                    let unique = format!("{base}_{}", uuid::Uuid::new_v4().simple());
                    seen.insert(unique.clone());
                    unique
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Stage for StorageStage {
    fn name(&self) -> &str {
        "vector_storage"
    }

    fn validate_config(&self) -> Result<(), IngestError> {
        if self.config.collection.trim().is_empty() {
            return Err(IngestError::configuration("storage collection name must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, mut board: Blackboard) -> Result<Blackboard, StageError> {
        let chunks: Vec<NormalizedChunk> = Blackboard::require(&board.normalized_chunks, BlackboardKey::NormalizedChunks)
            .map_err(|e| StageError::fatal(self.name(), e))?
            .clone();

        if chunks.is_empty() {
            tracing::warn!("no chunks to store");
            board.storage_result = Some(ingest_domain::entities::StorageReport::empty(
                self.store.provider_name(),
                &self.config.collection,
                self.config.distance_metric,
            ));
            return Ok(board);
        }

        let dimensions = chunks[0].embedded.embedding_dimensions;
        self.store
            .open(&self.config.collection, dimensions, self.config.distance_metric)
            .await
            .map_err(|e| StageError::fatal(self.name(), e))?;

        let mut deleted_count = 0u64;
        if self.config.delete_by_source {
            let mut seen_files = BTreeSet::new();
            for chunk in &chunks {
                seen_files.insert(chunk.embedded.enriched.chunk.source_file.clone());
            }
            for file_name in &seen_files {
                match self.store.delete_by_source(&self.config.collection, file_name).await {
                    Ok(count) => deleted_count += count,
                    Err(e) => tracing::warn!(file_name, error = %e, "delete-by-source failed, continuing"),
                }
            }
        }

        let ids = Self::assign_ids(&chunks);
        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(ids.into_iter())
            .map(|(chunk, id)| VectorRecord::from_normalized_chunk(chunk, id))
            .collect();

        let mut stored_count = 0u64;
        let mut failed_count = 0u64;
        for (batch_index, batch) in records.chunks(self.config.batch_size.max(1)).enumerate() {
            match self.store.upsert_batch(&self.config.collection, batch).await {
                Ok(count) => stored_count += count,
                Err(e) => {
                    tracing::error!(batch_index, error = %e, "vector storage batch failed, continuing");
                    failed_count += batch.len() as u64;
                }
            }
        }

        let mut report = self
            .store
            .report(&self.config.collection)
            .await
            .unwrap_or_else(|_| ingest_domain::entities::StorageReport::empty(
                self.store.provider_name(),
                &self.config.collection,
                self.config.distance_metric,
            ));
        report.stored_count = stored_count;
        report.failed_count = failed_count;
        report.deleted_count = deleted_count;

        tracing::info!(
            stored = stored_count,
            failed = failed_count,
            deleted = deleted_count,
            provider = self.store.provider_name(),
            "vector storage stage complete"
        );

        board.storage_result = Some(report);
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ingest_domain::entities::{Chunk, EmbeddedChunk, EnrichedChunk, StorageReport};
    use ingest_domain::value_objects::{ChunkingStrategy, DistanceMetric, Sensitivity};
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet as Set;

    struct RecordingStore {
        upserted: Mutex<Vec<VectorRecord>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        fn provider_name(&self) -> &str {
            "test-store"
        }

        async fn open(&self, _collection: &str, _dimensions: usize, _metric: DistanceMetric) -> Result<(), IngestError> {
            Ok(())
        }

        async fn delete_by_source(&self, _collection: &str, file_name: &str) -> Result<u64, IngestError> {
            self.deletes.lock().push(file_name.to_string());
            Ok(1)
        }

        async fn upsert_batch(&self, _collection: &str, records: &[VectorRecord]) -> Result<u64, IngestError> {
            self.upserted.lock().extend_from_slice(records);
            Ok(records.len() as u64)
        }

        async fn report(&self, collection: &str) -> Result<StorageReport, IngestError> {
            Ok(StorageReport::empty("test-store", collection, DistanceMetric::Cosine))
        }
    }

    fn normalized(text: &str, source_file: &str) -> NormalizedChunk {
        let chunk = Chunk::new(text.to_string(), source_file, 0, 1, ChunkingStrategy::Fixed);
        let enriched = EnrichedChunk::from_chunk(chunk, Sensitivity::Public, "other", Set::new());
        let embedded = EmbeddedChunk::new(enriched, vec![0.1, 0.2], "simulated", "simulated-384");
        NormalizedChunk::new(embedded, BTreeMap::new())
    }

    #[tokio::test]
    async fn stores_all_chunks_and_reports_counts() {
        let store = Arc::new(RecordingStore { upserted: Mutex::new(Vec::new()), deletes: Mutex::new(Vec::new()) });
        let mut config = StorageConfig::default();
        config.delete_by_source = true;
        config.batch_size = 1;
        let stage = StorageStage::new(config, store.clone());

        let mut board = Blackboard::new();
        board.normalized_chunks = Some(vec![normalized("a", "doc1.txt"), normalized("b", "doc2.txt")]);
        let board = stage.execute(board).await.unwrap();

        let report = board.storage_result.unwrap();
        assert_eq!(report.stored_count, 2);
        assert_eq!(store.upserted.lock().len(), 2);
        assert_eq!(store.deletes.lock().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_content_hash_gets_unique_id() {
        let store = Arc::new(RecordingStore { upserted: Mutex::new(Vec::new()), deletes: Mutex::new(Vec::new()) });
        let stage = StorageStage::new(StorageConfig::default(), store.clone());

        let mut board = Blackboard::new();
        board.normalized_chunks = Some(vec![normalized("same text", "doc.txt"), normalized("same text", "doc.txt")]);
        stage.execute(board).await.unwrap();

        let ids: Vec<String> = store.upserted.lock().iter().map(|r| r.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
    }
}
