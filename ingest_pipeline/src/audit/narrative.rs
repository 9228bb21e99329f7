// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Audit narrative templating and persistence. Grounded in
//! `original_source/rag_framework/steps/step_05_audit.py`'s
//! `_generate_audit_summary` (placeholder prompt substitution) and
//! `_save_json_summary`/`_save_txt_summary`/`_save_markdown_summary`.

use crate::config::NarrativeConfig;
use ingest_domain::entities::AuditRecord;
use ingest_domain::IngestError;
use std::path::PathBuf;

/// Fills `{timestamp}`, `{operation}`, `{documents_processed}`,
/// `{chunks_created}`, and `{total_pii_found}` placeholders in the
/// configured template.
pub fn render_prompt(template: &str, record: &AuditRecord) -> String {
    let total_pii_found = record.pii_detection.as_ref().map(|r| r.total_pii_found).unwrap_or(0);
    template
        .replace("{timestamp}", &record.timestamp.to_rfc3339())
        .replace("{operation}", &record.operation)
        .replace("{documents_processed}", &record.documents_processed.to_string())
        .replace("{chunks_created}", &record.chunks_created.to_string())
        .replace("{total_pii_found}", &total_pii_found.to_string())
}

fn render_path(template: &str, timestamp: &str, format: &str) -> PathBuf {
    PathBuf::from(template.replace("{timestamp}", timestamp).replace("{format}", format))
}

/// Persists the narrative summary in the configured format (`json`, `txt`,
/// or `markdown`/`md`); any other value falls back to `json`, mirroring the
/// Python step's `_save_audit_summary`.
pub fn persist(config: &NarrativeConfig, record: &AuditRecord, summary: &str) -> Result<PathBuf, IngestError> {
    let format = config.persist_format.as_deref().unwrap_or("json");
    let timestamp = record.timestamp.format("%Y%m%d_%H%M%S").to_string();
    let extension = match format {
        "markdown" => "md",
        other => other,
    };
    let path = render_path(&config.persist_path_template, &timestamp, extension);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = match format {
        "txt" => render_txt(record, summary, config.include_metadata),
        "markdown" | "md" => render_markdown(record, summary, config.include_metadata),
        _ => render_json(record, summary, config)?,
    };
    std::fs::write(&path, content)?;
    Ok(path)
}

fn render_json(record: &AuditRecord, summary: &str, config: &NarrativeConfig) -> Result<String, IngestError> {
    let mut value = serde_json::Map::new();
    if config.include_metadata {
        value.insert("timestamp".to_string(), serde_json::json!(record.timestamp.to_rfc3339()));
        value.insert("operation".to_string(), serde_json::json!(record.operation));
        value.insert("documents_processed".to_string(), serde_json::json!(record.documents_processed));
        value.insert("chunks_created".to_string(), serde_json::json!(record.chunks_created));
    }
    value.insert("llm_summary".to_string(), serde_json::json!(summary));
    if config.include_raw_record {
        value.insert("raw_audit_record".to_string(), serde_json::to_value(record)?);
    }
    serde_json::to_string_pretty(&value).map_err(IngestError::from)
}

fn render_txt(record: &AuditRecord, summary: &str, include_metadata: bool) -> String {
    let mut lines = vec!["=".repeat(70), "AUDIT SUMMARY".to_string(), "=".repeat(70), String::new()];
    if include_metadata {
        lines.push(format!("Date: {}", record.timestamp.to_rfc3339()));
        lines.push(format!("Operation: {}", record.operation));
        lines.push(format!("Documents processed: {}", record.documents_processed));
        lines.push(format!("Chunks created: {}", record.chunks_created));
        lines.push(String::new());
    }
    lines.push("Summary:".to_string());
    lines.push("-".repeat(70));
    lines.push(summary.to_string());
    lines.join("\n")
}

fn render_markdown(record: &AuditRecord, summary: &str, include_metadata: bool) -> String {
    let mut lines = vec!["# Audit Summary".to_string(), String::new()];
    if include_metadata {
        lines.push("## Metadata".to_string());
        lines.push(String::new());
        lines.push(format!("- **Date**: {}", record.timestamp.to_rfc3339()));
        lines.push(format!("- **Operation**: `{}`", record.operation));
        lines.push(format!("- **Documents processed**: {}", record.documents_processed));
        lines.push(format!("- **Chunks created**: {}", record.chunks_created));
        lines.push(String::new());
    }
    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push(summary.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_prompt_substitutes_known_placeholders() {
        let record = AuditRecord::new("document_ingestion", 2, 10);
        let rendered = render_prompt("{operation}: {documents_processed} docs, {chunks_created} chunks", &record);
        assert_eq!(rendered, "document_ingestion: 2 docs, 10 chunks");
    }

    #[test]
    fn render_path_substitutes_timestamp_and_format() {
        let path = render_path("output/audit/summary_{timestamp}.{format}", "20260101_000000", "json");
        assert_eq!(path, PathBuf::from("output/audit/summary_20260101_000000.json"));
    }
}
