// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A chunk with enrichment metadata attached: content hash, UTC
//! timestamp, sensitivity classification, document type, regulatory tags.

use crate::entities::chunk::Chunk;
use crate::value_objects::{ContentHash, Sensitivity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub content_hash: ContentHash,
    pub processed_at: DateTime<Utc>,
    pub sensitivity: Sensitivity,
    pub document_type: String,
    pub regulatory_tags: BTreeSet<String>,
}

impl EnrichedChunk {
    pub fn from_chunk(
        chunk: Chunk,
        sensitivity: Sensitivity,
        document_type: impl Into<String>,
        regulatory_tags: BTreeSet<String>,
    ) -> Self {
        let content_hash = ContentHash::of_text(&chunk.text);
        Self {
            chunk,
            content_hash,
            processed_at: Utc::now(),
            sensitivity,
            document_type: document_type.into(),
            regulatory_tags,
        }
    }

    /// Checks that `content_hash` still matches `hex(SHA256(text))`.
    pub fn content_hash_is_consistent(&self) -> bool {
        ContentHash::of_text(&self.chunk.text) == self.content_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::ChunkingStrategy;

    #[test]
    fn content_hash_matches_text() {
        let chunk = Chunk::new("hello".into(), "doc.txt", 0, 1, ChunkingStrategy::Fixed);
        let enriched = EnrichedChunk::from_chunk(chunk, Sensitivity::Public, "other", BTreeSet::new());
        assert!(enriched.content_hash_is_consistent());
        assert_eq!(
            enriched.content_hash.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
