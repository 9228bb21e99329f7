// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Chunking subsystem: four interchangeable strategies behind the
//! shared [`ingest_domain::services::Chunker`] trait, and the [`Stage`]
//! wiring that picks one per run and validates the chunks it produces.

pub mod fixed;
pub mod llm_guided;
pub mod recursive;
pub mod semantic;
pub mod stage;

pub use fixed::FixedChunker;
pub use llm_guided::LlmGuidedChunker;
pub use recursive::RecursiveChunker;
pub use semantic::SemanticChunker;
pub use stage::ChunkingStage;
