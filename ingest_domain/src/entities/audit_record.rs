// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-run audit record, appended as a JSONL line and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// PII scan results aggregated over a run's chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PiiReport {
    pub total_pii_found: u64,
    pub pii_types: BTreeMap<String, u64>,
    pub chunks_with_pii: Vec<usize>,
    pub recommendations: Vec<String>,
}

impl PiiReport {
    pub fn chunks_with_pii_count(&self) -> usize {
        self.chunks_with_pii.len()
    }

    /// Checks that `total_pii_found = Σ pii_types[·]`.
    pub fn is_consistent(&self) -> bool {
        self.total_pii_found == self.pii_types.values().sum::<u64>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub documents_processed: u64,
    pub chunks_created: u64,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub pii_detection: Option<PiiReport>,
    pub llm_summary: Option<String>,
}

impl AuditRecord {
    pub fn new(operation: impl Into<String>, documents_processed: u64, chunks_created: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            documents_processed,
            chunks_created,
            metadata: BTreeMap::new(),
            pii_detection: None,
            llm_summary: None,
        }
    }

    pub fn with_pii_detection(mut self, report: PiiReport) -> Self {
        self.pii_detection = Some(report);
        self
    }

    pub fn with_llm_summary(mut self, summary: impl Into<String>) -> Self {
        self.llm_summary = Some(summary.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pii_report_consistency() {
        let mut report = PiiReport::default();
        report.pii_types.insert("email".into(), 1);
        report.pii_types.insert("phone_fr".into(), 1);
        report.total_pii_found = 2;
        report.chunks_with_pii = vec![0];
        assert!(report.is_consistent());
        assert_eq!(report.chunks_with_pii_count(), 1);
    }
}
