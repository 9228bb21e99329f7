// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain service ports: the capability traits infrastructure adapters
//! implement (extraction, chunking, embedding, vector storage) and the one
//! stages must all satisfy.

pub mod chunker;
pub mod embedding_provider;
pub mod extractor;
pub mod stage;
pub mod vector_store;

pub use chunker::Chunker;
pub use embedding_provider::EmbeddingProvider;
pub use extractor::{Extractor, ExtractionOutcome};
pub use stage::{FromParameters, Stage, StageError};
pub use vector_store::{VectorRecord, VectorStore};
