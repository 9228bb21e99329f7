// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-session extraction metrics: totals and per-extractor
//! counts/times, written as a JSON summary when the extraction stage
//! finishes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorTally {
    pub attempts: u64,
    pub successes: u64,
    pub total_seconds: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetrics {
    pub documents_attempted: u64,
    pub documents_succeeded: u64,
    pub documents_failed: u64,
    pub total_input_bytes: u64,
    pub total_extracted_chars: u64,
    pub per_extractor: BTreeMap<String, ExtractorTally>,
    pub peak_memory_bytes: Option<u64>,
}

impl ExtractionMetrics {
    pub fn record_attempt(&mut self, extractor_name: &str, succeeded: bool, elapsed_seconds: f64) {
        let tally = self.per_extractor.entry(extractor_name.to_string()).or_default();
        tally.attempts += 1;
        tally.total_seconds += elapsed_seconds;
        if succeeded {
            tally.successes += 1;
        }
    }

    pub fn record_document(&mut self, input_bytes: u64, extracted_chars: u64, succeeded: bool) {
        self.documents_attempted += 1;
        self.total_input_bytes += input_bytes;
        if succeeded {
            self.documents_succeeded += 1;
            self.total_extracted_chars += extracted_chars;
        } else {
            self.documents_failed += 1;
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_successes_and_failures_separately() {
        let mut metrics = ExtractionMetrics::default();
        metrics.record_document(100, 80, true);
        metrics.record_document(50, 0, false);
        assert_eq!(metrics.documents_succeeded, 1);
        assert_eq!(metrics.documents_failed, 1);
        assert_eq!(metrics.total_extracted_chars, 80);
    }

    #[test]
    fn per_extractor_tally_accumulates() {
        let mut metrics = ExtractionMetrics::default();
        metrics.record_attempt("plain_text", true, 0.01);
        metrics.record_attempt("plain_text", false, 0.02);
        let tally = &metrics.per_extractor["plain_text"];
        assert_eq!(tally.attempts, 2);
        assert_eq!(tally.successes, 1);
    }
}
