// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A ChromaDB-like backend, talking to its collections REST API.
//! Grounded in `original_source/rag_framework/steps/step_08_vector_storage.py`'s
//! `_store_chromadb` for the collection get-or-create, delete-by-metadata,
//! and batch-add shape, ported from the `chromadb` Python client onto
//! direct HTTP calls since this crate carries no Chroma client crate.

use ingest_domain::services::{VectorRecord, VectorStore};
use ingest_domain::value_objects::DistanceMetric;
use ingest_domain::{entities::StorageReport, IngestError};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ChromaVectorStore {
    http: reqwest::Client,
    base_url: String,
}

impl ChromaVectorStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn collection_url(&self, collection: &str, suffix: &str) -> String {
        format!("{}/api/v1/collections/{collection}{suffix}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl VectorStore for ChromaVectorStore {
    fn provider_name(&self) -> &str {
        "chromadb"
    }

    async fn open(&self, collection: &str, dimensions: usize, metric: DistanceMetric) -> Result<(), IngestError> {
        let url = format!("{}/api/v1/collections", self.base_url.trim_end_matches('/'));
        let body = json!({
            "name": collection,
            "get_or_create": true,
            "metadata": { "dimensions": dimensions, "distance_metric": metric.to_string() },
        });
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("chromadb open collection failed: {e}")))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IngestError::VectorStore(format!("chromadb open collection returned error: {text}")));
        }
        Ok(())
    }

    async fn delete_by_source(&self, collection: &str, file_name: &str) -> Result<u64, IngestError> {
        let url = self.collection_url(collection, "/delete");
        let body = json!({ "where": { "source_file": { "$eq": file_name } } });
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("chromadb delete failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(0);
        }
        let ids: Vec<String> = response.json().await.unwrap_or_default();
        Ok(ids.len() as u64)
    }

    async fn upsert_batch(&self, collection: &str, records: &[VectorRecord]) -> Result<u64, IngestError> {
        if records.is_empty() {
            return Ok(0);
        }
        let url = self.collection_url(collection, "/upsert");
        let body = json!({
            "ids": records.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            "embeddings": records.iter().map(|r| r.embedding.clone()).collect::<Vec<_>>(),
            "documents": records.iter().map(|r| r.text.clone()).collect::<Vec<_>>(),
            "metadatas": records.iter().map(|r| r.metadata.clone()).collect::<Vec<_>>(),
        });
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("chromadb upsert failed: {e}")))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IngestError::VectorStore(format!("chromadb upsert batch rejected: {text}")));
        }
        Ok(records.len() as u64)
    }

    async fn report(&self, collection: &str) -> Result<StorageReport, IngestError> {
        let url = self.collection_url(collection, "/count");
        let count = self.http.get(&url).send().await.ok();
        let stored_count = match count {
            Some(response) if response.status().is_success() => response.json::<u64>().await.unwrap_or(0),
            _ => 0,
        };
        let mut report = StorageReport::empty("chromadb", collection, DistanceMetric::Cosine);
        report.stored_count = stored_count;
        Ok(report)
    }
}
