// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The vector storage capability: open, optional delete-by-source,
//! batched upsert, report. Every concrete backend (Chroma-like, Qdrant-like,
//! pgvector, Milvus-like, Weaviate-like) implements this one contract.

use crate::entities::{NormalizedChunk, StorageReport};
use crate::error::IngestError;
use crate::value_objects::DistanceMetric;
use async_trait::async_trait;

/// One record to be written by `upsert_batch`.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: std::collections::BTreeMap<String, String>,
    pub source_file: String,
}

impl VectorRecord {
    pub fn from_normalized_chunk(chunk: &NormalizedChunk, id: String) -> Self {
        Self {
            id,
            embedding: chunk.embedded.embedding.clone(),
            text: chunk.embedded.enriched.chunk.text.clone(),
            metadata: chunk.metadata.clone(),
            source_file: chunk.embedded.enriched.chunk.source_file.clone(),
        }
    }
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Ensures the collection/table exists with the given dimension and
    /// distance metric. Idempotent.
    async fn open(&self, collection: &str, dimensions: usize, metric: DistanceMetric) -> Result<(), IngestError>;

    /// Deletes all existing records whose `file_name` matches, ahead of
    /// insertion, giving idempotent re-ingest semantics. A no-op backend may
    /// return `Ok(0)` if delete-by-source is disabled in config.
    async fn delete_by_source(&self, collection: &str, file_name: &str) -> Result<u64, IngestError>;

    /// Writes records in groups of `batch_size`. Failures within one batch
    /// are the caller's responsibility to log and continue past — this
    /// method itself returns a hard error only for whole-batch failures
    /// (connection lost, auth failure), not a partial per-record failure.
    async fn upsert_batch(&self, collection: &str, records: &[VectorRecord]) -> Result<u64, IngestError>;

    async fn report(&self, collection: &str) -> Result<StorageReport, IngestError>;
}
