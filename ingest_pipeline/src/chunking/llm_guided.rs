// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! LLM-guided chunking: ask an LLM to identify natural section
//! boundaries, split the text at those offsets, and fall back to
//! [`RecursiveChunker`] whenever the LLM is unavailable, the call fails, or
//! the response carries no usable boundaries.
//!
//! Long documents are pre-split with the fixed-size chunker into pieces no
//! larger than `llm_single_call_budget` so each LLM call stays within a
//! bounded prompt size; the per-piece chunks are concatenated in order.

use crate::chunking::fixed::split_fixed;
use crate::chunking::recursive::{split_recursive, RecursiveChunker};
use crate::config::RateLimitConfig;
use crate::llm_client::LlmClient;
use crate::rate_limit;
use ingest_domain::entities::{Chunk, Document};
use ingest_domain::services::Chunker;
use ingest_domain::{value_objects::ChunkingStrategy, IngestError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub struct LlmGuidedChunker {
    pub llm_client: Option<LlmClient>,
    pub rate_limit: RateLimitConfig,
    pub prompt_template: String,
    pub llm_single_call_budget: usize,
    /// Used to pre-split oversized documents and as the fallback strategy.
    pub recursive_fallback: RecursiveChunker,
}

#[async_trait::async_trait]
impl Chunker for LlmGuidedChunker {
    fn strategy_name(&self) -> &'static str {
        "llm_guided"
    }

    async fn chunk(&self, document: &Document) -> Result<Vec<Chunk>, IngestError> {
        let parts = self.split_text(&document.text).await;
        let total = parts.len();
        let source_file = document.file_path.display().to_string();
        Ok(parts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(text, source_file.clone(), index, total, ChunkingStrategy::LlmGuided))
            .collect())
    }
}

impl LlmGuidedChunker {
    async fn split_text(&self, text: &str) -> Vec<String> {
        let Some(client) = &self.llm_client else {
            tracing::warn!("no LLM client configured for llm_guided chunking, falling back to recursive");
            return split_recursive(text, self.recursive_fallback.chunk_size, self.recursive_fallback.chunk_overlap, &self.recursive_fallback.separators);
        };

        if text.chars().count() > self.llm_single_call_budget {
            let preliminary = split_fixed(text, self.llm_single_call_budget, 0);
            tracing::info!(
                chars = text.chars().count(),
                preliminary_chunks = preliminary.len(),
                "text exceeds llm_single_call_budget, analyzing preliminary chunks individually"
            );
            let mut out = Vec::new();
            for piece in preliminary {
                out.extend(self.analyze_with_llm(client, &piece).await);
            }
            out
        } else {
            self.analyze_with_llm(client, text).await
        }
    }

    async fn analyze_with_llm(&self, client: &LlmClient, text: &str) -> Vec<String> {
        let prompt = self.prompt_template.replace("{text}", text);
        let rate_limit = self.rate_limit.clone();
        let result = rate_limit::with_retry(&rate_limit, || {
            let client = client.clone();
            let prompt = prompt.clone();
            async move { client.complete(&prompt).await }
        })
        .await;

        let content = match result {
            Ok(content) => content,
            Err(err) => {
                tracing::error!(error = %err, "llm_guided chunking call failed, falling back to recursive");
                return split_recursive(text, self.recursive_fallback.chunk_size, self.recursive_fallback.chunk_overlap, &self.recursive_fallback.separators);
            }
        };

        let boundaries = parse_llm_boundaries(&content);
        if boundaries.is_empty() {
            tracing::warn!("llm_guided chunking found no boundaries, falling back to recursive");
            return split_recursive(text, self.recursive_fallback.chunk_size, self.recursive_fallback.chunk_overlap, &self.recursive_fallback.separators);
        }

        split_at_boundaries(text, &boundaries)
    }
}

/// Splits `text` at the given boundary positions (Unicode scalar offsets),
/// dropping boundaries outside `(0, len(text))` and any resulting empty
/// piece, matching the teacher pipeline's reference chunker.
fn split_at_boundaries(text: &str, boundaries: &[i64]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;
    let mut sorted: Vec<i64> = boundaries.iter().copied().filter(|&b| b > 0 && b < len).collect();
    sorted.sort_unstable();

    let mut chunks = Vec::new();
    let mut prev = 0usize;
    for pos in sorted {
        let pos = pos as usize;
        chunks.push(chars[prev..pos].iter().collect::<String>());
        prev = pos;
    }
    if prev < chars.len() {
        chunks.push(chars[prev..].iter().collect());
    }
    chunks.into_iter().filter(|c| !c.is_empty()).collect()
}

static MARKDOWN_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*\n?(\{.*?\})\s*\n?```").unwrap());
static SIMPLE_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{[^{}]*\}").unwrap());
static BOUNDARIES_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?s)\{.*?"boundaries".*?\[.*?\].*?\}"#).unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*?$").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Extracts integer chunk-boundary offsets from a free-form LLM reply.
/// Tries, in order: a markdown-fenced JSON object, the whole trimmed
/// response as JSON, a regex-extracted `{...}` span (after stripping
/// comments and trailing commas). Never errors — an unparseable or
/// boundary-less response yields an empty vec so the caller falls back.
fn parse_llm_boundaries(response: &str) -> Vec<i64> {
    let mut response = response.to_string();
    if let Some(captures) = MARKDOWN_FENCE.captures(&response) {
        response = captures.get(1).unwrap().as_str().to_string();
    }

    let trimmed = response.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        if let Ok(data) = serde_json::from_str::<Value>(trimmed) {
            let boundaries = data.get("boundaries").cloned().unwrap_or(Value::Array(Vec::new()));
            if let Some(array) = boundaries.as_array() {
                return coerce_boundaries(array);
            }
        }
    }

    let json_str = SIMPLE_BRACES
        .find(&response)
        .or_else(|| BOUNDARIES_BRACES.find(&response))
        .map(|m| m.as_str().to_string());

    let Some(json_str) = json_str else {
        return Vec::new();
    };

    let cleaned = LINE_COMMENT.replace_all(&json_str, "");
    let cleaned = BLOCK_COMMENT.replace_all(&cleaned, "");
    let cleaned = TRAILING_COMMA.replace_all(&cleaned, "$1");

    let Ok(data) = serde_json::from_str::<Value>(&cleaned) else {
        return Vec::new();
    };

    match data.get("boundaries").and_then(Value::as_array) {
        Some(array) => coerce_boundaries(array),
        None => Vec::new(),
    }
}

/// Accepts ints, floats, and numeric strings; silently drops anything else.
fn coerce_boundaries(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Number(n) => n.as_f64().map(|f| f as i64),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok().map(|f| f as i64)
                }
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pure_json_object() {
        let response = r#"{"boundaries": [10, 25, 40]}"#;
        assert_eq!(parse_llm_boundaries(response), vec![10, 25, 40]);
    }

    #[test]
    fn parses_markdown_fenced_json() {
        let response = "Here are the boundaries:\n```json\n{\"boundaries\": [5, 15]}\n```\nHope that helps.";
        assert_eq!(parse_llm_boundaries(response), vec![5, 15]);
    }

    #[test]
    fn extracts_json_embedded_in_narrative_text() {
        let response = "Sure, I analyzed it. {\"boundaries\": [3, 9]} Let me know if you need more.";
        assert_eq!(parse_llm_boundaries(response), vec![3, 9]);
    }

    #[test]
    fn strips_comments_and_trailing_commas() {
        let response = "{\"boundaries\": [1, 2, ] // trailing comma and comment\n}";
        assert_eq!(parse_llm_boundaries(response), vec![1, 2]);
    }

    #[test]
    fn coerces_numeric_strings_and_floats() {
        let response = r#"{"boundaries": ["10", 20.7, 30]}"#;
        assert_eq!(parse_llm_boundaries(response), vec![10, 20, 30]);
    }

    #[test]
    fn drops_invalid_entries_silently() {
        let response = r#"{"boundaries": [10, "not a number", 30, null]}"#;
        assert_eq!(parse_llm_boundaries(response), vec![10, 30]);
    }

    #[test]
    fn returns_empty_on_unparseable_response() {
        let response = "I'm sorry, I can't help with that.";
        assert!(parse_llm_boundaries(response).is_empty());
    }

    #[test]
    fn split_at_boundaries_drops_out_of_range_positions() {
        let text = "0123456789";
        let chunks = split_at_boundaries(text, &[0, 4, 10, 7]);
        assert_eq!(chunks, vec!["0123", "456", "789"]);
    }

    #[test]
    fn split_at_boundaries_handles_no_valid_positions() {
        let text = "hello";
        let chunks = split_at_boundaries(text, &[0, 100, -5]);
        assert_eq!(chunks, vec!["hello"]);
    }
}
