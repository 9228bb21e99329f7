// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The chunking capability. Semantic chunking needs sentence
//! embeddings, so `chunk` is async; Fixed/Recursive/LLM-guided implementors
//! simply don't await anything.

use crate::entities::{Chunk, Document};
use crate::error::IngestError;
use async_trait::async_trait;

#[async_trait]
pub trait Chunker: Send + Sync {
    fn strategy_name(&self) -> &'static str;

    async fn chunk(&self, document: &Document) -> Result<Vec<Chunk>, IngestError>;
}
