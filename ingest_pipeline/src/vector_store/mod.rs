// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Vector storage backends: one [`ingest_domain::services::VectorStore`]
//! implementation per supported provider, plus the stage that drives
//! whichever one is configured.

pub mod chroma;
pub mod milvus;
pub mod pgvector;
pub mod qdrant;
pub mod stage;
pub mod weaviate;

pub use chroma::ChromaVectorStore;
pub use milvus::MilvusVectorStore;
pub use pgvector::PgVectorStore;
pub use qdrant::QdrantVectorStore;
pub use stage::StorageStage;
pub use weaviate::WeaviateVectorStore;
