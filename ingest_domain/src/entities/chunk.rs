// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An ordered fragment of a document's text. Invariants:
//! `chunk_index ∈ [0, total_chunks)`, `(source_file, chunk_index)` unique
//! within a run, `min_size ≤ len(text) ≤ max_size` after validation.

use crate::value_objects::ChunkingStrategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_file: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub chunking_strategy: ChunkingStrategy,
}

impl Chunk {
    pub fn new(
        text: String,
        source_file: impl Into<String>,
        chunk_index: usize,
        total_chunks: usize,
        chunking_strategy: ChunkingStrategy,
    ) -> Self {
        Self {
            text,
            source_file: source_file.into(),
            chunk_index,
            total_chunks,
            chunking_strategy,
        }
    }

    pub fn within_size_bounds(&self, min_size: usize, max_size: usize) -> bool {
        let len = self.text.chars().count();
        len >= min_size && len <= max_size
    }
}
