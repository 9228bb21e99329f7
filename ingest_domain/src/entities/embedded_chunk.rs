// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An enriched chunk plus its embedding vector. All chunks in one run
//! must share `embedding_dimensions`.

use crate::entities::enriched_chunk::EnrichedChunk;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    #[serde(flatten)]
    pub enriched: EnrichedChunk,
    pub embedding: Vec<f32>,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
}

impl EmbeddedChunk {
    pub fn new(enriched: EnrichedChunk, embedding: Vec<f32>, provider: impl Into<String>, model: impl Into<String>) -> Self {
        let embedding_dimensions = embedding.len();
        Self {
            enriched,
            embedding,
            embedding_provider: provider.into(),
            embedding_model: model.into(),
            embedding_dimensions,
        }
    }
}

/// All embedded chunks passed in must share one embedding dimensionality;
/// used by the embedding stage before promoting its output to the
/// blackboard.
pub fn all_share_dimensionality(chunks: &[EmbeddedChunk]) -> bool {
    match chunks.first() {
        None => true,
        Some(first) => chunks.iter().all(|c| c.embedding_dimensions == first.embedding_dimensions),
    }
}
