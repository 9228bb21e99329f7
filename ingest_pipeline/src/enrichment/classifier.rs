// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pure classification helpers for enrichment: sensitivity keyword
//! fallback, document-type-by-filename heuristic, and regulatory-tag
//! keyword scan. The LLM sensitivity path lives in `stage.rs` since it
//! needs the rate-limit wrapper and async I/O; these helpers are its
//! synchronous default and fallback.

use ingest_domain::value_objects::Sensitivity;
use std::collections::{BTreeMap, BTreeSet};

const SENSITIVE_KEYWORDS: [&str; 4] = ["confidentiel", "secret", "privé", "interne"];

/// Default sensitivity classifier: bumps to `Confidentiel` on any sensitive
/// keyword hit, otherwise returns the configured default level.
pub fn classify_sensitivity_by_keyword(text: &str, default_level: Sensitivity) -> Sensitivity {
    let lower = text.to_lowercase();
    if SENSITIVE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Sensitivity::Confidentiel
    } else {
        default_level
    }
}

/// Parses an LLM sensitivity reply: first token of the first non-empty
/// line, lowercased; falls back to `default_level` on anything that isn't
/// one of the four known levels.
pub fn parse_llm_sensitivity(response: &str, default_level: Sensitivity) -> Sensitivity {
    let first_line = response.trim().lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let first_word = first_line.trim().split_whitespace().next().unwrap_or("").to_lowercase();
    first_word.parse::<Sensitivity>().unwrap_or(default_level)
}

/// Classifies document type by keyword match against the source file path,
/// first keyword list to match wins; falls back to `"other"`.
pub fn classify_document_type(source_file: &str, keywords: &BTreeMap<String, Vec<String>>) -> String {
    let lower = source_file.to_lowercase();
    for (doc_type, terms) in keywords {
        if terms.iter().any(|term| lower.contains(&term.to_lowercase())) {
            return doc_type.clone();
        }
    }
    "other".to_string()
}

/// Scans `text` for configured regulatory-framework keywords.
pub fn extract_regulatory_tags(text: &str, keywords: &BTreeMap<String, Vec<String>>) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|(_, terms)| terms.iter().any(|term| lower.contains(&term.to_lowercase())))
        .map(|(tag, _)| tag.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_classifier_escalates_on_sensitive_term() {
        let result = classify_sensitivity_by_keyword("this is a secret plan", Sensitivity::Public);
        assert_eq!(result, Sensitivity::Confidentiel);
    }

    #[test]
    fn keyword_classifier_falls_back_to_default() {
        let result = classify_sensitivity_by_keyword("nothing special here", Sensitivity::Interne);
        assert_eq!(result, Sensitivity::Interne);
    }

    #[test]
    fn parses_llm_reply_first_token() {
        let response = "confidentiel\n\nexplanation: this document discusses salaries.";
        assert_eq!(parse_llm_sensitivity(response, Sensitivity::Interne), Sensitivity::Confidentiel);
    }

    #[test]
    fn invalid_llm_reply_falls_back_to_default() {
        let response = "I'm not sure, maybe public?";
        assert_eq!(parse_llm_sensitivity(response, Sensitivity::Secret), Sensitivity::Secret);
    }

    #[test]
    fn document_type_matches_by_filename_keyword() {
        let mut keywords = BTreeMap::new();
        keywords.insert("contract".to_string(), vec!["contract".to_string()]);
        assert_eq!(classify_document_type("2024_supplier_contract.pdf", &keywords), "contract");
        assert_eq!(classify_document_type("notes.txt", &keywords), "other");
    }

    #[test]
    fn regulatory_tags_scans_all_matches() {
        let mut keywords = BTreeMap::new();
        keywords.insert("RGPD".to_string(), vec!["rgpd".to_string()]);
        keywords.insert("ISO27001".to_string(), vec!["iso 27001".to_string()]);
        let tags = extract_regulatory_tags("This policy covers RGPD and ISO 27001 compliance.", &keywords);
        assert!(tags.contains("RGPD"));
        assert!(tags.contains("ISO27001"));
    }
}
