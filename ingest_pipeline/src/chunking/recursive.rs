// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Recursive-separator chunking: split on the highest-priority
//! separator that yields parts not exceeding `chunk_size`, recursing into
//! oversize parts with the next separator; merge adjacent small parts up to
//! `chunk_size`, carrying `chunk_overlap` characters into the next chunk.

use ingest_domain::entities::{Chunk, Document};
use ingest_domain::services::Chunker;
use ingest_domain::{value_objects::ChunkingStrategy, IngestError};

pub struct RecursiveChunker {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

/// Splits `text` using `separators` in priority order, recursing into any
/// part still over `chunk_size`, then merges adjacent small parts up to
/// `chunk_size` and carries `chunk_overlap` characters between emitted
/// chunks.
pub fn split_recursive(text: &str, chunk_size: usize, chunk_overlap: usize, separators: &[String]) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let raw_parts = split_recurse(text, separators);
    merge_parts(&raw_parts, chunk_size, chunk_overlap)
}

fn split_recurse(text: &str, separators: &[String]) -> Vec<String> {
    let Some((sep, rest_separators)) = separators.split_first() else {
        return text.chars().map(|c| c.to_string()).collect();
    };

    let parts: Vec<&str> = if sep.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    } else {
        text.split(sep.as_str()).collect()
    };

    let mut out = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() && i < parts.len() - 1 {
            continue;
        }
        out.push(part.to_string());
        if i < parts.len() - 1 {
            // reattach separator to keep recombination lossless for merge step
            if let Some(last) = out.last_mut() {
                last.push_str(sep);
            }
        }
    }
    out.into_iter()
        .flat_map(|part| {
            if part.chars().count() > 0 {
                split_recurse(&part, rest_separators)
            } else {
                Vec::new()
            }
        })
        .collect()
}

fn merge_parts(parts: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for part in parts {
        let candidate_len = current.chars().count() + part.chars().count();
        if !current.is_empty() && candidate_len > chunk_size {
            chunks.push(current.clone());
            let overlap_tail: String = current.chars().rev().take(chunk_overlap).collect::<Vec<_>>().into_iter().rev().collect();
            current = overlap_tail;
        }
        current.push_str(part);
        while current.chars().count() > chunk_size.max(1) {
            let split_at = chunk_size.max(1);
            let head: String = current.chars().take(split_at).collect();
            chunks.push(head);
            let overlap_tail: String = chunks
                .last()
                .unwrap()
                .chars()
                .rev()
                .take(chunk_overlap)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            let remainder: String = current.chars().skip(split_at).collect();
            current = format!("{overlap_tail}{remainder}");
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait::async_trait]
impl Chunker for RecursiveChunker {
    fn strategy_name(&self) -> &'static str {
        "recursive"
    }

    async fn chunk(&self, document: &Document) -> Result<Vec<Chunk>, IngestError> {
        let parts = split_recursive(&document.text, self.chunk_size, self.chunk_overlap, &self.separators);
        let total = parts.len();
        let source_file = document.file_path.display().to_string();
        Ok(parts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(text, source_file.clone(), index, total, ChunkingStrategy::Recursive))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_separators() -> Vec<String> {
        vec!["\n\n\n".into(), "\n\n".into(), "\n".into(), " ".into(), "".into()]
    }

    #[test]
    fn splits_on_paragraph_boundaries_within_budget() {
        let text = "Para one is short.\n\nPara two is also reasonably short.\n\nPara three closes things out.";
        let chunks = split_recursive(text, 40, 5, &default_separators());
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40 + 5);
        }
    }

    #[test]
    fn falls_back_to_character_split_for_unbreakable_text() {
        let text = "a".repeat(100);
        let chunks = split_recursive(&text, 20, 0, &["".to_string()]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
        assert!(chunks.len() >= 5);
    }
}
