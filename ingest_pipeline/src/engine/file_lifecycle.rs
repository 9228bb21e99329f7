// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Post-run file movement: successfully processed source files
//! move to `processed/`, failed ones move to `errors/` with a `.error`
//! sidecar. Grounded in
//! `original_source/rag_framework/utils/file_manager.py`'s
//! `move_file_to_processed`/`move_file_to_errors`/`_compute_destination_path`
//! (structure preservation, numeric-suffix collision handling). The
//! extraction stage records outcomes into an [`crate::extraction::outcome_log::OutcomeLog`]
//! during the run; this runs once afterward against the finished snapshot.

use crate::extraction::outcome_log::FileOutcome;
use ingest_domain::IngestError;
use std::path::{Path, PathBuf};

pub struct FileLifecycle {
    pub watch_root: PathBuf,
    pub processed_dir: PathBuf,
    pub errors_dir: PathBuf,
    pub preserve_structure: bool,
}

impl FileLifecycle {
    pub fn new(watch_root: PathBuf, processed_dir: PathBuf, errors_dir: PathBuf) -> Self {
        Self { watch_root, processed_dir, errors_dir, preserve_structure: true }
    }

    /// Moves every outcome's source file to `processed/` or `errors/`,
    /// logging and continuing past individual move failures (a missing or
    /// already-moved file is not fatal to the run).
    pub fn apply(&self, outcomes: &[FileOutcome]) -> Result<(), IngestError> {
        for outcome in outcomes {
            if !outcome.path.exists() {
                tracing::warn!(path = %outcome.path.display(), "source file missing for lifecycle move, skipping");
                continue;
            }
            let result = if outcome.succeeded {
                self.move_to(&outcome.path, &self.processed_dir, None)
            } else {
                self.move_to(&outcome.path, &self.errors_dir, outcome.error.as_deref())
            };
            if let Err(e) = result {
                tracing::error!(path = %outcome.path.display(), error = %e, "file lifecycle move failed");
            }
        }
        Ok(())
    }

    fn destination(&self, source: &Path, dest_dir: &Path) -> PathBuf {
        let relative = if self.preserve_structure {
            source.parent().and_then(|parent| parent.strip_prefix(&self.watch_root).ok())
        } else {
            None
        };
        let mut dest = match relative {
            Some(rel) if !rel.as_os_str().is_empty() => dest_dir.join(rel),
            _ => dest_dir.to_path_buf(),
        };
        let file_name = source.file_name().unwrap_or_default();
        dest.push(file_name);

        let mut candidate = dest.clone();
        let mut counter = 1u32;
        while candidate.exists() {
            let stem = dest.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
            let extension = dest.extension().and_then(|e| e.to_str());
            let numbered = match extension {
                Some(ext) => format!("{stem}_{counter}.{ext}"),
                None => format!("{stem}_{counter}"),
            };
            candidate = dest.with_file_name(numbered);
            counter += 1;
        }
        candidate
    }

    fn move_to(&self, source: &Path, dest_dir: &Path, error_msg: Option<&str>) -> Result<PathBuf, IngestError> {
        let dest = self.destination(source, dest_dir);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(source, &dest)?;

        if let Some(msg) = error_msg {
            let sidecar = dest.with_extension(format!(
                "{}.error",
                dest.extension().and_then(|e| e.to_str()).unwrap_or("")
            ));
            std::fs::write(&sidecar, format!("error: {msg}\nsource: {}\n", source.display()))?;
        }
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn outcome(path: PathBuf, succeeded: bool, error: Option<&str>) -> FileOutcome {
        FileOutcome { path, succeeded, error: error.map(String::from), timestamp: Utc::now() }
    }

    #[test]
    fn moves_succeeded_file_into_processed_preserving_structure() {
        let dir = tempfile::tempdir().unwrap();
        let watch_root = dir.path().join("input");
        std::fs::create_dir_all(watch_root.join("sub")).unwrap();
        let source = watch_root.join("sub").join("a.txt");
        std::fs::write(&source, "hi").unwrap();

        let lifecycle = FileLifecycle::new(watch_root.clone(), dir.path().join("processed"), dir.path().join("errors"));
        lifecycle.apply(&[outcome(source.clone(), true, None)]).unwrap();

        assert!(!source.exists());
        assert!(dir.path().join("processed").join("sub").join("a.txt").exists());
    }

    #[test]
    fn moves_failed_file_into_errors_with_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let watch_root = dir.path().join("input");
        std::fs::create_dir_all(&watch_root).unwrap();
        let source = watch_root.join("bad.pdf");
        std::fs::write(&source, "hi").unwrap();

        let lifecycle = FileLifecycle::new(watch_root, dir.path().join("processed"), dir.path().join("errors"));
        lifecycle.apply(&[outcome(source.clone(), false, Some("no text layer"))]).unwrap();

        let moved = dir.path().join("errors").join("bad.pdf");
        assert!(moved.exists());
        assert!(moved.with_extension("pdf.error").exists());
    }

    #[test]
    fn collision_gets_numeric_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let watch_root = dir.path().join("input");
        std::fs::create_dir_all(&watch_root).unwrap();
        std::fs::create_dir_all(dir.path().join("processed")).unwrap();
        std::fs::write(dir.path().join("processed").join("a.txt"), "existing").unwrap();
        let source = watch_root.join("a.txt");
        std::fs::write(&source, "new").unwrap();

        let lifecycle = FileLifecycle::new(watch_root, dir.path().join("processed"), dir.path().join("errors"));
        lifecycle.apply(&[outcome(source, true, None)]).unwrap();

        assert!(dir.path().join("processed").join("a_1.txt").exists());
    }
}
