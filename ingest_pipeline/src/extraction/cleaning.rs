// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Post-extraction text cleaning: a configurable sequence of pure string
//! transforms applied in a fixed order.

use crate::config::CleaningConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(?:[Pp]age\s+)?\d{1,4}\s*$").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Runs every enabled step in order and returns the cleaned text.
pub fn clean(text: &str, config: &CleaningConfig) -> String {
    let mut out = text.to_string();
    if config.normalize_whitespace {
        out = normalize_whitespace(&out);
    }
    if config.strip_page_numbers {
        out = strip_page_numbers(&out);
    }
    if config.remove_blank_lines {
        out = remove_blank_lines(&out);
    }
    if config.min_line_length > 0 {
        out = remove_short_lines(&out, config.min_line_length);
    }
    if config.strip_html_tags {
        out = strip_html_tags(&out);
    }
    if config.lowercase {
        out = out.to_lowercase();
    }
    if config.strip_special_chars {
        out = strip_special_chars(&out);
    }
    out
}

pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    BLANK_LINE_RUN.replace_all(&collapsed, "\n\n").trim().to_string()
}

pub fn strip_page_numbers(text: &str) -> String {
    PAGE_NUMBER.replace_all(text, "").to_string()
}

pub fn remove_blank_lines(text: &str) -> String {
    text.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>().join("\n")
}

pub fn remove_short_lines(text: &str, min_line_length: usize) -> String {
    text.lines()
        .filter(|l| l.trim().is_empty() || l.trim().chars().count() >= min_line_length)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").to_string()
}

pub fn strip_special_chars(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,;:!?-'\"()".contains(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_blank_line_runs() {
        let out = normalize_whitespace("a   b\n\n\n\nc");
        assert_eq!(out, "a b\n\nc");
    }

    #[test]
    fn strips_bare_page_numbers() {
        let out = strip_page_numbers("intro\n42\nmore text\nPage 3\n");
        assert!(!out.contains('\n') || !out.lines().any(|l| l.trim() == "42"));
    }

    #[test]
    fn removes_lines_shorter_than_minimum() {
        let out = remove_short_lines("ok line here\nhi\nanother ok line", 5);
        assert!(!out.contains("hi"));
        assert!(out.contains("ok line here"));
    }
}
