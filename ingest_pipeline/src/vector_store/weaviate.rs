// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A Weaviate-like backend over its schema/objects/batch REST API.
//! Grounded in `original_source/rag_framework/steps/step_08_vector_storage.py`'s
//! `_store_weaviate` (class-per-collection schema, `where`-filter delete,
//! `vectorizer: none` since embeddings are supplied).

use ingest_domain::services::{VectorRecord, VectorStore};
use ingest_domain::value_objects::DistanceMetric;
use ingest_domain::{entities::StorageReport, IngestError};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct WeaviateVectorStore {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeaviateVectorStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let mut request = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request
    }
}

#[async_trait::async_trait]
impl VectorStore for WeaviateVectorStore {
    fn provider_name(&self) -> &str {
        "weaviate"
    }

    async fn open(&self, collection: &str, _dimensions: usize, metric: DistanceMetric) -> Result<(), IngestError> {
        let exists = self
            .request(reqwest::Method::GET, &format!("/v1/schema/{collection}"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false);
        if exists {
            return Ok(());
        }
        let body = json!({
            "class": collection,
            "vectorizer": "none",
            "vectorIndexConfig": { "distance": metric.to_string() },
            "properties": [
                { "name": "text", "dataType": ["text"] },
                { "name": "sourceFile", "dataType": ["text"] },
            ],
        });
        let response = self
            .request(reqwest::Method::POST, "/v1/schema")
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("weaviate create class failed: {e}")))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IngestError::VectorStore(format!("weaviate create class rejected: {text}")));
        }
        Ok(())
    }

    async fn delete_by_source(&self, collection: &str, file_name: &str) -> Result<u64, IngestError> {
        let body = json!({
            "match": {
                "class": collection,
                "where": { "path": ["sourceFile"], "operator": "Equal", "valueText": file_name },
            },
            "output": "minimal",
        });
        let response = self
            .request(reqwest::Method::DELETE, "/v1/batch/objects")
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("weaviate delete failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(0);
        }
        let parsed = response.json::<serde_json::Value>().await.unwrap_or_default();
        Ok(parsed["results"]["successful"].as_u64().unwrap_or(0))
    }

    async fn upsert_batch(&self, collection: &str, records: &[VectorRecord]) -> Result<u64, IngestError> {
        if records.is_empty() {
            return Ok(0);
        }
        let objects: Vec<_> = records
            .iter()
            .map(|r| {
                json!({
                    "class": collection,
                    "id": r.id,
                    "vector": r.embedding,
                    "properties": { "text": r.text, "sourceFile": r.source_file },
                })
            })
            .collect();
        let body = json!({ "objects": objects });
        let response = self
            .request(reqwest::Method::POST, "/v1/batch/objects")
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::VectorStore(format!("weaviate upsert failed: {e}")))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IngestError::VectorStore(format!("weaviate upsert batch rejected: {text}")));
        }
        Ok(records.len() as u64)
    }

    async fn report(&self, collection: &str) -> Result<StorageReport, IngestError> {
        Ok(StorageReport::empty("weaviate", collection, DistanceMetric::Cosine))
    }
}
