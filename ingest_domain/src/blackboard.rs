// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The shared record passed between stages.
//!
//! Rather than a dynamic dict keyed by string, this is a plain struct with
//! one optional field per known key. Writing an unknown key is not
//! representable — there is no
//! string-keyed insertion path at all — and each stage's output type makes
//! clear which single field it owns.

use crate::entities::{AuditRecord, Chunk, Document, EmbeddedChunk, EnrichedChunk, NormalizedChunk, StorageReport};
use std::path::PathBuf;

/// Identifies a blackboard slot for error messages ("stage X expected key Y
/// but it was empty"). Never used for runtime dispatch.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BlackboardKey {
    MonitoredFiles,
    ExtractedDocuments,
    Chunks,
    EnrichedChunks,
    AuditRecord,
    EmbeddedChunks,
    NormalizedChunks,
    StorageResult,
}

impl BlackboardKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlackboardKey::MonitoredFiles => "monitored_files",
            BlackboardKey::ExtractedDocuments => "extracted_documents",
            BlackboardKey::Chunks => "chunks",
            BlackboardKey::EnrichedChunks => "enriched_chunks",
            BlackboardKey::AuditRecord => "audit_record",
            BlackboardKey::EmbeddedChunks => "embedded_chunks",
            BlackboardKey::NormalizedChunks => "normalized_chunks",
            BlackboardKey::StorageResult => "storage_result",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    pub monitored_files: Option<Vec<PathBuf>>,
    pub extracted_documents: Option<Vec<Document>>,
    pub chunks: Option<Vec<Chunk>>,
    pub enriched_chunks: Option<Vec<EnrichedChunk>>,
    pub audit_record: Option<AuditRecord>,
    pub embedded_chunks: Option<Vec<EmbeddedChunk>>,
    pub normalized_chunks: Option<Vec<NormalizedChunk>>,
    pub storage_result: Option<StorageReport>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches a required input, or an error naming which key a stage was
    /// missing. Stages call this instead of unwrapping directly so the
    /// resulting message is uniform across the pipeline.
    pub fn require<'a, T>(field: &'a Option<T>, key: BlackboardKey) -> Result<&'a T, crate::error::IngestError> {
        field.as_ref().ok_or_else(|| {
            crate::error::IngestError::validation(key.as_str(), "required blackboard key is missing")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_missing_key_by_name() {
        let board = Blackboard::new();
        let err = Blackboard::require(&board.chunks, BlackboardKey::Chunks).unwrap_err();
        assert!(err.to_string().contains("chunks"));
    }

    #[test]
    fn require_returns_present_value() {
        let mut board = Blackboard::new();
        board.monitored_files = Some(vec![PathBuf::from("a.txt")]);
        let files = Blackboard::require(&board.monitored_files, BlackboardKey::MonitoredFiles).unwrap();
        assert_eq!(files.len(), 1);
    }
}
