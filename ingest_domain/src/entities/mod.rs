// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entities: the records that flow through the blackboard between stages.

pub mod audit_record;
pub mod cache_entry;
pub mod chunk;
pub mod document;
pub mod embedded_chunk;
pub mod enriched_chunk;
pub mod extraction_result;
pub mod normalized_chunk;
pub mod storage_report;

pub use audit_record::{AuditRecord, PiiReport};
pub use cache_entry::CacheEntry;
pub use chunk::Chunk;
pub use document::Document;
pub use embedded_chunk::EmbeddedChunk;
pub use enriched_chunk::EnrichedChunk;
pub use extraction_result::ExtractionResult;
pub use normalized_chunk::NormalizedChunk;
pub use storage_report::StorageReport;
