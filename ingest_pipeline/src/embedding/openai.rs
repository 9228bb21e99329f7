// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An OpenAI-compatible embeddings provider: covers `openai`,
//! `mistral_ai`, `ollama`, and `lm_studio` per the original step's provider
//! list, since all four expose the same `/embeddings` wire shape. Grounded
//! in `llm_client::LlmClient`'s reqwest usage and
//! `llmspell-rag/src/embeddings/openai.rs`'s request/response shape.

use ingest_domain::services::EmbeddingProvider;
use ingest_domain::IngestError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingProvider {
    http: reqwest::Client,
    endpoint: String,
    credential: Option<String>,
    provider_name: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    pub fn new(
        provider_name: impl Into<String>,
        endpoint: impl Into<String>,
        credential: Option<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client builds with default TLS backend"),
            endpoint: endpoint.into(),
            credential,
            provider_name: provider_name.into(),
            model: model.into(),
            dimensions,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.endpoint.trim_end_matches('/'));
        let body = EmbeddingsRequest { model: &self.model, input: texts };
        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.credential {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| IngestError::EmbeddingProvider(format!("embedding request to {url} failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(IngestError::RateLimited { retry_after_secs });
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(IngestError::EmbeddingProvider(format!("embedding call returned {status}: {text}")));
        }
        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| IngestError::EmbeddingProvider(format!("malformed embedding response: {e}")))?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
