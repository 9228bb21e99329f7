// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain error system for the ingestion pipeline.
//!
//! Errors are categorized by behavioral class rather than by the subsystem
//! that raised them, so the stage engine can decide fatal-vs-recoverable
//! without downcasting: configuration errors are fatal at startup, validation
//! errors are fatal at stage construction, and per-item errors are caught and
//! logged by the calling stage.

use thiserror::Error;

/// Domain-specific errors for the ingestion pipeline.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error in {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("extraction failed for {path}: {reason}")]
    ExtractionFailed { path: String, reason: String },

    #[error("all extractors failed for {path}: {attempts:?}")]
    AllExtractorsFailed { path: String, attempts: Vec<String> },

    #[error("chunking failed: {0}")]
    ChunkingFailed(String),

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("stage '{stage}' failed: {source}")]
    StageFatal {
        stage: String,
        #[source]
        source: Box<IngestError>,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Coarse-grained category, used for metrics and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Extraction,
    Chunking,
    RateLimit,
    Embedding,
    VectorStore,
    Cache,
    StageFatal,
    Internal,
    Io,
    Serialization,
}

impl IngestError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn stage_fatal(stage: impl Into<String>, source: IngestError) -> Self {
        Self::StageFatal {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Per-item recoverable errors may be caught, logged, and skipped by the
    /// calling stage without aborting the run. Configuration and validation
    /// errors are never recoverable: they are fatal at startup/construction.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IngestError::ExtractionFailed { .. }
                | IngestError::AllExtractorsFailed { .. }
                | IngestError::ChunkingFailed(_)
                | IngestError::Cache(_)
                | IngestError::VectorStore(_)
                | IngestError::Io(_)
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, IngestError::RateLimited { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::Configuration(_) => ErrorCategory::Configuration,
            IngestError::Validation { .. } => ErrorCategory::Validation,
            IngestError::ExtractionFailed { .. } | IngestError::AllExtractorsFailed { .. } => {
                ErrorCategory::Extraction
            }
            IngestError::ChunkingFailed(_) => ErrorCategory::Chunking,
            IngestError::RateLimited { .. } => ErrorCategory::RateLimit,
            IngestError::EmbeddingProvider(_) => ErrorCategory::Embedding,
            IngestError::VectorStore(_) => ErrorCategory::VectorStore,
            IngestError::Cache(_) => ErrorCategory::Cache,
            IngestError::StageFatal { .. } => ErrorCategory::StageFatal,
            IngestError::Internal(_) => ErrorCategory::Internal,
            IngestError::Io(_) => ErrorCategory::Io,
            IngestError::Serialization(_) => ErrorCategory::Serialization,
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        let err = IngestError::ExtractionFailed {
            path: "a.pdf".into(),
            reason: "no text layer".into(),
        };
        assert!(err.is_recoverable());

        let err = IngestError::configuration("missing providers section");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn stage_fatal_wraps_source() {
        let inner = IngestError::configuration("bad value");
        let wrapped = IngestError::stage_fatal("extraction", inner);
        assert!(wrapped.to_string().contains("stage 'extraction' failed"));
    }

    #[test]
    fn category_mapping() {
        assert_eq!(
            IngestError::RateLimited { retry_after_secs: 2 }.category(),
            ErrorCategory::RateLimit
        );
    }
}
