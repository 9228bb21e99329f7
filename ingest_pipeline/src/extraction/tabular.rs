// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Tabular extraction for CSV/TSV and spreadsheet workbooks (XLSX/XLS/ODS),
//! rendered to markdown tables with a per-sheet prefix for multi-sheet
//! workbooks.

use calamine::{open_workbook_auto, Reader};
use ingest_domain::entities::ExtractionResult;
use ingest_domain::services::Extractor;
use std::path::Path;

const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv"];
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "ods"];

pub struct TabularExtractor;

impl TabularExtractor {
    fn extract_delimited(&self, path: &Path) -> ExtractionResult {
        let delimiter = if path.extension().and_then(|e| e.to_str()) == Some("tsv") { b'\t' } else { b',' };
        let mut reader = match csv::ReaderBuilder::new().delimiter(delimiter).flexible(true).from_path(path) {
            Ok(r) => r,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot open CSV: {e}")),
        };
        let headers = reader.headers().cloned().unwrap_or_default();
        let mut out = String::new();
        if !headers.is_empty() {
            out.push_str(&format!("| {} |\n", headers.iter().collect::<Vec<_>>().join(" | ")));
            out.push_str(&format!("|{}|\n", "---|".repeat(headers.len())));
        }
        let mut row_count = 0usize;
        for record in reader.records().flatten() {
            out.push_str(&format!("| {} |\n", record.iter().collect::<Vec<_>>().join(" | ")));
            row_count += 1;
        }
        if out.trim().is_empty() {
            return ExtractionResult::failure(self.name(), "empty CSV file");
        }
        ExtractionResult::success(self.name(), out, 0.95)
            .with_metadata("row_count", serde_json::Value::from(row_count))
    }

    fn extract_workbook(&self, path: &Path) -> ExtractionResult {
        let mut workbook = match open_workbook_auto(path) {
            Ok(w) => w,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot open workbook: {e}")),
        };
        let sheet_names = workbook.sheet_names().to_vec();
        let mut out = String::new();
        let mut sheet_count = 0usize;
        for sheet_name in &sheet_names {
            let range = match workbook.worksheet_range(sheet_name) {
                Ok(r) => r,
                Err(_) => continue,
            };
            out.push_str(&format!("## {sheet_name}\n\n"));
            for row in range.rows() {
                let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
            out.push('\n');
            sheet_count += 1;
        }
        if out.trim().is_empty() {
            return ExtractionResult::failure(self.name(), "workbook contained no readable sheets");
        }
        ExtractionResult::success(self.name(), out, 0.9)
            .with_metadata("sheet_count", serde_json::Value::from(sheet_count))
    }
}

impl Extractor for TabularExtractor {
    fn name(&self) -> &str {
        "tabular"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let lower = e.to_lowercase();
                DELIMITED_EXTENSIONS.contains(&lower.as_str()) || WORKBOOK_EXTENSIONS.contains(&lower.as_str())
            })
            .unwrap_or(false)
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if DELIMITED_EXTENSIONS.contains(&ext.as_str()) => self.extract_delimited(path),
            Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) => self.extract_workbook(path),
            _ => ExtractionResult::failure(self.name(), "unsupported tabular extension"),
        }
    }

    fn min_text_length(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "name,age\nalice,30\nbob,40\n").unwrap();
        let result = TabularExtractor.extract(&path);
        assert!(result.success);
        assert!(result.text.contains("alice"));
    }

    #[test]
    fn rejects_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        let result = TabularExtractor.extract(&path);
        assert!(!result.success);
    }
}
