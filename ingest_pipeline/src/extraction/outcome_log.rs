// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-file pass/fail outcomes, recorded out-of-band from the blackboard.
//!
//! The blackboard exclusively owns the *current* typed value for each known
//! key — it has no slot for "here's what happened to file N", since
//! that's a side-effect of extraction, not data any later stage consumes.
//! `FileLifecycle` needs it anyway, to decide whether a source file moves
//! to `processed/` or `errors/` with a `.error` sidecar. This log is
//! the side-channel: the extraction stage appends to it as it works, and
//! the composition root hands the finished log to `FileLifecycle` after the
//! run completes.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub succeeded: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct OutcomeLog {
    entries: Arc<Mutex<Vec<FileOutcome>>>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, path: PathBuf) {
        self.entries.lock().push(FileOutcome {
            path,
            succeeded: true,
            error: None,
            timestamp: Utc::now(),
        });
    }

    pub fn record_failure(&self, path: PathBuf, error: impl Into<String>) {
        self.entries.lock().push(FileOutcome {
            path,
            succeeded: false,
            error: Some(error.into()),
            timestamp: Utc::now(),
        });
    }

    pub fn snapshot(&self) -> Vec<FileOutcome> {
        self.entries.lock().clone()
    }

    /// Takes the accumulated entries, leaving the log empty for the next
    /// run. Used between `--watch` passes so `FileLifecycle` never replays
    /// a file it already moved.
    pub fn drain(&self) -> Vec<FileOutcome> {
        std::mem::take(&mut self.entries.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_successes_and_failures_independently() {
        let log = OutcomeLog::new();
        log.record_success(PathBuf::from("a.txt"));
        log.record_failure(PathBuf::from("b.pdf"), "no text layer");
        let entries = log.snapshot();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].succeeded);
        assert!(!entries[1].succeeded);
        assert_eq!(entries[1].error.as_deref(), Some("no text layer"));
    }

    #[test]
    fn drain_empties_the_log() {
        let log = OutcomeLog::new();
        log.record_success(PathBuf::from("a.txt"));
        assert_eq!(log.drain().len(), 1);
        assert!(log.snapshot().is_empty());
    }
}
