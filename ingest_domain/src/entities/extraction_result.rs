// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The output of a single extractor attempt.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub success: bool,
    pub extractor_name: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub error: Option<String>,
    pub confidence_score: f64,
}

impl ExtractionResult {
    /// Constructs a successful result. Panics in debug builds if `text` is
    /// empty, since `success=true ⇒ len(text) ≥ 1` is a data invariant, not a
    /// recoverable condition an extractor should ever produce.
    pub fn success(extractor_name: impl Into<String>, text: String, confidence_score: f64) -> Self {
        debug_assert!(!text.is_empty(), "success result must carry non-empty text");
        Self {
            text,
            success: true,
            extractor_name: extractor_name.into(),
            metadata: HashMap::new(),
            error: None,
            confidence_score: confidence_score.clamp(0.0, 1.0),
        }
    }

    pub fn failure(extractor_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            success: false,
            extractor_name: extractor_name.into(),
            metadata: HashMap::new(),
            error: Some(error.into()),
            confidence_score: 0.0,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// `success ∧ len(strip(text)) ≥ min_text_length ∧ confidence ≥
    /// min_confidence` — default validation policy, overridable by
    /// extractors with stricter needs.
    pub fn validate(&self, min_text_length: usize, min_confidence: f64) -> bool {
        self.success
            && self.text.trim().len() >= min_text_length
            && self.confidence_score >= min_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_has_empty_text() {
        let r = ExtractionResult::failure("pdf_fast", "no text layer");
        assert!(!r.success);
        assert_eq!(r.text, "");
    }

    #[test]
    fn default_validation_policy() {
        let r = ExtractionResult::success("plain_text", "hello world".into(), 0.9);
        assert!(r.validate(5, 0.5));
        assert!(!r.validate(100, 0.5));
    }
}
