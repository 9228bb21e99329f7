// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The four chunking strategies; exactly one is active per run.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    Fixed,
    Recursive,
    Semantic,
    LlmGuided,
}

impl ChunkingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkingStrategy::Fixed => "fixed",
            ChunkingStrategy::Recursive => "recursive",
            ChunkingStrategy::Semantic => "semantic",
            ChunkingStrategy::LlmGuided => "llm_guided",
        }
    }
}

impl Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(ChunkingStrategy::Fixed),
            "recursive" => Ok(ChunkingStrategy::Recursive),
            "semantic" => Ok(ChunkingStrategy::Semantic),
            "llm_guided" | "llm-guided" => Ok(ChunkingStrategy::LlmGuided),
            other => Err(format!("unknown chunking strategy '{other}'")),
        }
    }
}
