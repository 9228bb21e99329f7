// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The pgvector backend, a table in an existing PostgreSQL database
//! with the `vector` extension enabled. Grounded in
//! `original_source/rag_framework/steps/step_08_vector_storage.py`'s
//! `_store_pgvector` (extension/table/index creation, `ON CONFLICT`
//! upsert, delete-by-filename). This crate has no `pgvector` Rust crate in
//! its dependency stack, so the embedding is bound as a bracketed literal
//! and cast to `vector` in SQL rather than via a typed bind.

use ingest_domain::services::{VectorRecord, VectorStore};
use ingest_domain::value_objects::DistanceMetric;
use ingest_domain::{entities::StorageReport, IngestError};
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct PgVectorStore {
    pool: PgPool,
    table_prefix: String,
}

impl PgVectorStore {
    pub async fn connect(connection_string: &str, table_prefix: impl Into<String>) -> Result<Self, IngestError> {
        let pool = PgPool::connect(connection_string)
            .await
            .map_err(|e| IngestError::VectorStore(format!("pgvector connection failed: {e}")))?;
        Ok(Self { pool, table_prefix: table_prefix.into() })
    }

    fn table_name(&self, collection: &str) -> String {
        format!("{}{collection}", self.table_prefix)
    }

    fn operator(metric: DistanceMetric) -> &'static str {
        match metric {
            DistanceMetric::Cosine => "<=>",
            DistanceMetric::L2 => "<->",
            DistanceMetric::InnerProduct => "<#>",
        }
    }

    fn embedding_literal(embedding: &[f32]) -> String {
        let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
        format!("[{}]", values.join(","))
    }
}

#[async_trait::async_trait]
impl VectorStore for PgVectorStore {
    fn provider_name(&self) -> &str {
        "pgvector"
    }

    async fn open(&self, collection: &str, dimensions: usize, metric: DistanceMetric) -> Result<(), IngestError> {
        let table = self.table_name(collection);
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| IngestError::VectorStore(format!("pgvector extension setup failed: {e}")))?;

        let create = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                id TEXT PRIMARY KEY, \
                embedding vector({dimensions}), \
                content TEXT, \
                metadata JSONB, \
                source_file TEXT, \
                created_at TIMESTAMPTZ DEFAULT now())"
        );
        sqlx::query(&create)
            .execute(&self.pool)
            .await
            .map_err(|e| IngestError::VectorStore(format!("pgvector table creation failed: {e}")))?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {table}_embedding_idx ON {table} \
                USING ivfflat (embedding {}) WITH (lists = 100)",
            Self::operator(metric)
        );
        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| IngestError::VectorStore(format!("pgvector index creation failed: {e}")))?;
        Ok(())
    }

    async fn delete_by_source(&self, collection: &str, file_name: &str) -> Result<u64, IngestError> {
        let table = self.table_name(collection);
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE source_file = $1"))
            .bind(file_name)
            .execute(&self.pool)
            .await
            .map_err(|e| IngestError::VectorStore(format!("pgvector delete failed: {e}")))?;
        Ok(result.rows_affected())
    }

    async fn upsert_batch(&self, collection: &str, records: &[VectorRecord]) -> Result<u64, IngestError> {
        if records.is_empty() {
            return Ok(0);
        }
        let table = self.table_name(collection);
        let mut stored = 0u64;
        for record in records {
            let metadata = serde_json::to_value(&record.metadata)
                .map_err(|e| IngestError::VectorStore(format!("pgvector metadata encoding failed: {e}")))?;
            let embedding_literal = Self::embedding_literal(&record.embedding);
            let query = format!(
                "INSERT INTO {table} (id, embedding, content, metadata, source_file) \
                    VALUES ($1, $2::vector, $3, $4, $5) \
                    ON CONFLICT (id) DO UPDATE SET \
                    embedding = EXCLUDED.embedding, content = EXCLUDED.content, \
                    metadata = EXCLUDED.metadata, source_file = EXCLUDED.source_file"
            );
            sqlx::query(&query)
                .bind(&record.id)
                .bind(&embedding_literal)
                .bind(&record.text)
                .bind(&metadata)
                .bind(&record.source_file)
                .execute(&self.pool)
                .await
                .map_err(|e| IngestError::VectorStore(format!("pgvector upsert failed for {}: {e}", record.id)))?;
            stored += 1;
        }
        Ok(stored)
    }

    async fn report(&self, collection: &str) -> Result<StorageReport, IngestError> {
        let table = self.table_name(collection);
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| IngestError::VectorStore(format!("pgvector count failed: {e}")))?;
        let mut report = StorageReport::empty("pgvector", collection, DistanceMetric::Cosine);
        report.stored_count = count.0.max(0) as u64;
        Ok(report)
    }
}
