// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A Milvus-like backend over its v2 RESTful `/v1/vector` proxy API
//! (the native client is gRPC-based; the REST proxy is the wire shape a
//! `reqwest`-based client can speak without an additional gRPC stack).
//! Grounded in `original_source/rag_framework/steps/step_08_vector_storage.py`'s
//! `_store_milvus` collection/insert/delete sequencing.

use ingest_domain::services::{VectorRecord, VectorStore};
use ingest_domain::value_objects::DistanceMetric;
use ingest_domain::{entities::StorageReport, IngestError};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct MilvusVectorStore {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MilvusVectorStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let mut request = self.http.post(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request
    }

    fn metric_name(metric: DistanceMetric) -> &'static str {
        match metric {
            DistanceMetric::Cosine => "COSINE",
            DistanceMetric::L2 => "L2",
            DistanceMetric::InnerProduct => "IP",
        }
    }
}

#[async_trait::async_trait]
impl VectorStore for MilvusVectorStore {
    fn provider_name(&self) -> &str {
        "milvus"
    }

    async fn open(&self, collection: &str, dimensions: usize, metric: DistanceMetric) -> Result<(), IngestError> {
        let body = json!({
            "collectionName": collection,
            "dimension": dimensions,
            "metricType": Self::metric_name(metric),
        });
        let response = self
            .request("/v1/vector/collections/create")
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("milvus create collection failed: {e}")))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            if !text.contains("already exist") {
                return Err(IngestError::VectorStore(format!("milvus create collection rejected: {text}")));
            }
        }
        Ok(())
    }

    async fn delete_by_source(&self, collection: &str, file_name: &str) -> Result<u64, IngestError> {
        let body = json!({
            "collectionName": collection,
            "filter": format!("source_file == \"{file_name}\""),
        });
        let response = self
            .request("/v1/vector/delete")
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("milvus delete failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(0);
        }
        Ok(0)
    }

    async fn upsert_batch(&self, collection: &str, records: &[VectorRecord]) -> Result<u64, IngestError> {
        if records.is_empty() {
            return Ok(0);
        }
        let data: Vec<_> = records
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "vector": r.embedding,
                    "text": r.text,
                    "source_file": r.source_file,
                })
            })
            .collect();
        let body = json!({ "collectionName": collection, "data": data });
        let response = self
            .request("/v1/vector/upsert")
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("milvus upsert failed: {e}")))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IngestError::VectorStore(format!("milvus upsert batch rejected: {text}")));
        }
        Ok(records.len() as u64)
    }

    async fn report(&self, collection: &str) -> Result<StorageReport, IngestError> {
        Ok(StorageReport::empty("milvus", collection, DistanceMetric::Cosine))
    }
}
