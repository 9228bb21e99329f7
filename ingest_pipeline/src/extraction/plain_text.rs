// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Plain-text extraction with encoding auto-detection: tries an
//! ordered list of encodings and falls back to lossy UTF-8 replacement,
//! reporting whichever encoding it used in `metadata.encoding`.

use ingest_domain::entities::ExtractionResult;
use ingest_domain::services::Extractor;
use std::path::Path;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "rst", "log", "json", "yaml", "yml", "toml", "ini", "cfg"];

const TRY_ENCODINGS: &[&encoding_rs::Encoding] = &[
    encoding_rs::UTF_8,
    encoding_rs::WINDOWS_1252,
    encoding_rs::ISO_8859_15,
];

pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain_text"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot read file: {e}")),
        };
        for encoding in TRY_ENCODINGS {
            let (decoded, _, had_errors) = encoding.decode(&bytes);
            if !had_errors {
                return ExtractionResult::success(self.name(), decoded.into_owned(), 1.0)
                    .with_metadata("encoding", serde_json::Value::String(encoding.name().to_string()));
            }
        }
        let (decoded, _, _) = encoding_rs::UTF_8.decode(&bytes);
        if decoded.trim().is_empty() {
            return ExtractionResult::failure(self.name(), "no decodable text content");
        }
        ExtractionResult::success(self.name(), decoded.into_owned(), 0.5)
            .with_metadata("encoding", serde_json::Value::String("utf-8 (lossy)".to_string()))
    }

    fn min_text_length(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_text_extensions() {
        let e = PlainTextExtractor;
        assert!(e.can_extract(Path::new("notes.md")));
        assert!(!e.can_extract(Path::new("report.pdf")));
    }

    #[test]
    fn extracts_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();
        let result = PlainTextExtractor.extract(&path);
        assert!(result.success);
        assert_eq!(result.text, "hello world");
    }
}
