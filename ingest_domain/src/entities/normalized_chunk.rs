// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An embedded chunk whose embedding has been L2-normalized and whose
//! metadata has been validated and trimmed.

use crate::entities::embedded_chunk::EmbeddedChunk;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedChunk {
    #[serde(flatten)]
    pub embedded: EmbeddedChunk,
    pub metadata: BTreeMap<String, String>,
}

impl NormalizedChunk {
    pub fn new(embedded: EmbeddedChunk, metadata: BTreeMap<String, String>) -> Self {
        Self { embedded, metadata }
    }

    /// `|‖embedding‖₂ − 1| < 1e-6` for any chunk with a non-zero input
    /// embedding.
    pub fn embedding_is_unit_norm(&self) -> bool {
        let norm: f32 = self
            .embedded
            .embedding
            .iter()
            .map(|x| x * x)
            .sum::<f32>()
            .sqrt();
        norm == 0.0 || (norm - 1.0).abs() < 1e-6
    }
}
