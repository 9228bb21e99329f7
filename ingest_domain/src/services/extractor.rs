// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The extractor capability. Outcome is a plain three-way result
//! variant rather than exceptions.

use crate::entities::ExtractionResult;
use std::path::Path;

/// The outcome of trying one extractor on one file, used by
/// `FallbackManager`'s selection loop to decide whether to keep going.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Validated(ExtractionResult),
    Invalid(ExtractionResult),
    Error(String),
}

pub trait Extractor: Send + Sync {
    /// Stable name used in profile extractor-name lists and error messages.
    fn name(&self) -> &str;

    /// Decided by file extension against this extractor's fixed supported
    /// set — never by sniffing content.
    fn can_extract(&self, path: &Path) -> bool;

    /// Must not raise for routine failure; returns `success=false` with an
    /// error message instead.
    fn extract(&self, path: &Path) -> ExtractionResult;

    /// Default policy: `success ∧ len(strip(text)) ≥ min_text_length ∧
    /// confidence ≥ min_confidence`. Extractors may override with stricter
    /// rules.
    fn validate_result(&self, result: &ExtractionResult) -> bool {
        result.validate(self.min_text_length(), self.min_confidence())
    }

    fn min_text_length(&self) -> usize {
        1
    }

    fn min_confidence(&self) -> f64 {
        0.0
    }
}
