// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Fixed-size sliding-window chunking: `chunk_size`-character windows
//! stepping by `chunk_size - overlap`, with a final window that may be
//! shorter than `chunk_size` once it runs past the end of the text.

use ingest_domain::entities::{Chunk, Document};
use ingest_domain::services::Chunker;
use ingest_domain::{value_objects::ChunkingStrategy, IngestError};

pub struct FixedChunker {
    pub chunk_size: usize,
    pub overlap: usize,
}

/// Splits `text` (by Unicode scalar value) into `chunk_size`-wide windows
/// stepping by `chunk_size - overlap`. The window start always advances by
/// the fixed step, even once a window has reached the end of the text, so
/// the final window can be short and can overlap its predecessor by more
/// than `overlap` characters.
pub fn split_fixed(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut out = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        start += step;
    }
    out
}

#[async_trait::async_trait]
impl Chunker for FixedChunker {
    fn strategy_name(&self) -> &'static str {
        "fixed"
    }

    async fn chunk(&self, document: &Document) -> Result<Vec<Chunk>, IngestError> {
        let parts = split_fixed(&document.text, self.chunk_size, self.overlap);
        let total = parts.len();
        let source_file = document.file_path.display().to_string();
        Ok(parts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(text, source_file.clone(), index, total, ChunkingStrategy::Fixed))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_ceil_formula_chunk_count() {
        let text = "a".repeat(1000);
        let parts = split_fixed(&text, 300, 50);
        let expected = ((1000 - 50) as f64 / (300 - 50) as f64).ceil() as usize;
        assert_eq!(parts.len(), expected);
    }

    #[test]
    fn four_windows_with_a_short_trailing_chunk() {
        let text = "a".repeat(2500);
        let parts = split_fixed(&text, 1000, 200);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].chars().count(), 1000);
        assert_eq!(parts[1].chars().count(), 1000);
        assert_eq!(parts[2].chars().count(), 900);
        assert_eq!(parts[3].chars().count(), 100);
    }

    #[test]
    fn consecutive_chunks_share_overlap_characters() {
        let text = "0123456789".repeat(10);
        let parts = split_fixed(&text, 20, 5);
        assert!(parts.len() >= 2);
        let tail_of_first: String = parts[0].chars().rev().take(5).collect::<Vec<_>>().into_iter().rev().collect();
        let head_of_second: String = parts[1].chars().take(5).collect();
        assert_eq!(tail_of_first, head_of_second);
    }

    proptest::proptest! {
        /// `len(Cᵢ.text) ≤ chunk_size` for every chunk, for arbitrary text
        /// length and `overlap < chunk_size`.
        #[test]
        fn every_chunk_respects_chunk_size_bound(
            len in 0usize..500,
            chunk_size in 1usize..100,
            overlap in 0usize..99,
        ) {
            let overlap = overlap.min(chunk_size.saturating_sub(1));
            let text = "x".repeat(len);
            let parts = split_fixed(&text, chunk_size, overlap);
            for part in &parts {
                proptest::prop_assert!(part.chars().count() <= chunk_size);
            }
        }

        /// The windows collectively cover every character of the input:
        /// walking the chunks in order and appending only the portion of
        /// each window past what the previous window already covered
        /// reconstructs the original text exactly, even when the final
        /// window is short or fully redundant with its predecessor.
        #[test]
        fn chunks_union_covers_the_input_exactly(
            len in 0usize..500,
            chunk_size in 1usize..100,
            overlap in 0usize..99,
        ) {
            let overlap = overlap.min(chunk_size.saturating_sub(1));
            let text = "x".repeat(len);
            let parts = split_fixed(&text, chunk_size, overlap);
            let step = chunk_size.saturating_sub(overlap).max(1);

            let mut reconstructed = String::new();
            let mut covered = 0usize;
            for (i, part) in parts.iter().enumerate() {
                let start = i * step;
                let end = (start + chunk_size).min(len);
                if end > covered {
                    reconstructed.extend(part.chars().skip(covered.saturating_sub(start)));
                    covered = end;
                }
            }
            proptest::prop_assert_eq!(reconstructed, text);
        }
    }
}
