// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Trait
//!
//! The unified trait every pipeline stage implements, whether built-in
//! (extraction, chunking, enrichment, ...) or a future custom stage.
//!
//! ## One trait, one capability set
//!
//! Earlier designs gave each stage its own ad-hoc trait with its own method
//! names. That made the engine's dispatch code grow one branch per stage
//! type and made custom stages second-class citizens. Here every stage is
//! polymorphic over the same capability set: `validate_config` at
//! construction time, `execute` at run time. The engine never needs to know
//! which concrete stage it is holding.
//!
//! ## Async, unlike a CPU-bound pipeline stage
//!
//! A stage here performs network calls (embedding/LLM providers), subprocess
//! calls (OCR), and file I/O (extraction, cache, file lifecycle) — so unlike
//! a synchronous chunk-transform stage, `execute` is `async`.

use crate::blackboard::Blackboard;
use crate::error::IngestError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Converts a stage's `HashMap<String, String>` parameters (as loaded from
/// its YAML config) into a typed configuration struct. Mirrors the
/// `FromStr` pattern: implementors provide `from_parameters`, callers get a
/// typed value or a descriptive error.
pub trait FromParameters: Sized {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError>;
}

/// Carries enough context for the engine to decide whether to abort the run
/// or continue with the next stage.
#[derive(Debug)]
pub struct StageError {
    pub stage: String,
    pub source: IngestError,
    pub fatal: bool,
}

impl StageError {
    pub fn fatal(stage: impl Into<String>, source: IngestError) -> Self {
        Self {
            stage: stage.into(),
            source,
            fatal: true,
        }
    }

    pub fn recoverable(stage: impl Into<String>, source: IngestError) -> Self {
        Self {
            stage: stage.into(),
            source,
            fatal: false,
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stage={} error={}", self.stage, self.source)
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable name used in logs, metrics, and `StageError::stage`.
    fn name(&self) -> &str;

    /// Called once at construction, before any data is processed. A
    /// non-`Ok` return is fatal at startup.
    fn validate_config(&self) -> Result<(), IngestError>;

    /// The only mutation point: takes the accumulated blackboard and
    /// returns it with this stage's output slot filled in.
    async fn execute(&self, board: Blackboard) -> Result<Blackboard, StageError>;
}
