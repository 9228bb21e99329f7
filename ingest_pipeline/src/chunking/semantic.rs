// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Semantic chunking: split into sentences, embed each one, and open
//! a new chunk when the running chunk is already at `max_chunk_size` or the
//! cosine similarity between consecutive sentence embeddings drops below
//! `similarity_threshold` while the current chunk already meets
//! `min_chunk_size`.
//!
//! The embedding model is *not* configured here — the composition root
//! injects the embedding stage's own provider so there's exactly one place
//! a run's embedding model is chosen. If that provider is unavailable this
//! falls back to `RecursiveChunker`.

use crate::chunking::recursive::{split_recursive, RecursiveChunker};
use ingest_domain::entities::{Chunk, Document};
use ingest_domain::services::{Chunker, EmbeddingProvider};
use ingest_domain::{value_objects::ChunkingStrategy, IngestError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

// The `regex` crate has no lookbehind, so the boundary pattern captures the
// terminator and the following whitespace together; splitting re-attaches
// the terminator to the sentence it closes rather than the one it opens.
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?]+)\s+").unwrap());

pub struct SemanticChunker {
    pub embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    pub similarity_threshold: f32,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub fallback_separators: Vec<String>,
    pub fallback_chunk_size: usize,
    pub fallback_overlap: usize,
}

pub fn split_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let mut sentences = Vec::new();
    let mut last_end = 0usize;
    for caps in SENTENCE_BOUNDARY.captures_iter(trimmed) {
        let whole = caps.get(0).unwrap();
        let terminator_end = caps.get(1).unwrap().end();
        let sentence = trimmed[last_end..terminator_end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        last_end = whole.end();
    }
    let tail = trimmed[last_end..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Walks embedded sentences, grouping into chunks per the similarity/size
/// rule, given the sentence texts and their pre-computed embeddings.
pub fn group_sentences(sentences: &[String], embeddings: &[Vec<f32>], similarity_threshold: f32, min_chunk_size: usize, max_chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for (i, sentence) in sentences.iter().enumerate() {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);

        let current_len = current.chars().count();
        let at_max = current_len >= max_chunk_size;
        let similarity_drop = if i + 1 < sentences.len() {
            cosine_similarity(&embeddings[i], &embeddings[i + 1]) < similarity_threshold
        } else {
            false
        };
        let should_break = at_max || (similarity_drop && current_len >= min_chunk_size);
        if should_break && i + 1 < sentences.len() {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait::async_trait]
impl Chunker for SemanticChunker {
    fn strategy_name(&self) -> &'static str {
        "semantic"
    }

    async fn chunk(&self, document: &Document) -> Result<Vec<Chunk>, IngestError> {
        let source_file = document.file_path.display().to_string();

        let Some(provider) = &self.embedding_provider else {
            let parts = split_recursive(&document.text, self.fallback_chunk_size, self.fallback_overlap, &self.fallback_separators);
            let total = parts.len();
            return Ok(parts
                .into_iter()
                .enumerate()
                .map(|(i, text)| Chunk::new(text, source_file.clone(), i, total, ChunkingStrategy::Semantic))
                .collect());
        };

        let sentences = split_sentences(&document.text);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = match provider.embed_batch(&sentences).await {
            Ok(e) => e,
            Err(_) => {
                let recursive = RecursiveChunker {
                    chunk_size: self.fallback_chunk_size,
                    chunk_overlap: self.fallback_overlap,
                    separators: self.fallback_separators.clone(),
                };
                return recursive.chunk(document).await;
            }
        };

        let parts = group_sentences(&sentences, &embeddings, self.similarity_threshold, self.min_chunk_size, self.max_chunk_size);
        let total = parts.len();
        Ok(parts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(text, source_file.clone(), i, total, ChunkingStrategy::Semantic))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_sentence_terminators() {
        let sentences = split_sentences("First sentence. Second sentence! Third one?");
        assert_eq!(sentences.len(), 3);
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn breaks_chunk_when_similarity_drops_past_min_size() {
        let sentences = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let embeddings = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let groups = group_sentences(&sentences, &embeddings, 0.5, 1, 1000);
        assert_eq!(groups.len(), 2);
    }
}
