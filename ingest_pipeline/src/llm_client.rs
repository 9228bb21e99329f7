// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A minimal OpenAI-compatible chat-completion client shared by the three
//! collaborators that need free-text LLM calls: enrichment's sensitivity
//! classifier, the audit narrative synthesizer, and llm-guided chunking's
//! boundary analysis. One client shape, one provider
//! contract — the stages differ only in the prompt they send.

use ingest_domain::IngestError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Option<String>,
    model: String,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient {
    pub fn new(endpoint: impl Into<String>, credential: Option<String>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client builds with default TLS backend"),
            endpoint: endpoint.into(),
            credential,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a single-turn prompt and returns the assistant's reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, IngestError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };
        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.credential {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| IngestError::EmbeddingProvider(format!("llm request to {url} failed: {e}")))?;

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
            return Err(IngestError::EmbeddingProvider(format!("llm call returned {status}: {text}")));
        }
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| IngestError::EmbeddingProvider(format!("malformed llm response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| IngestError::EmbeddingProvider("llm response had no choices".to_string()))
    }
}
