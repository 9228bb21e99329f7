// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! HTML/XML extraction: strips `<script>`/`<style>` and a fixed
//! structural-tag list, rendering headings/lists/quotes in a markdown-ish
//! shape rather than collapsing everything to flat text.

use ingest_domain::entities::ExtractionResult;
use ingest_domain::services::Extractor;
use scraper::{Html, Selector};
use std::path::Path;

const SUPPORTED_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "xml"];
const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "template"];

pub struct HtmlExtractor;

impl HtmlExtractor {
    fn render(&self, document: &Html) -> String {
        let mut out = String::new();
        let body_selector = Selector::parse("body").unwrap();
        let element = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());
        Self::walk(&element, &mut out);
        out
    }

    fn walk(element: &scraper::ElementRef, out: &mut String) {
        let tag = element.value().name();
        if STRIPPED_TAGS.contains(&tag) {
            return;
        }
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                out.push_str(&"#".repeat(level));
                out.push(' ');
                out.push_str(element.text().collect::<Vec<_>>().join("").trim());
                out.push_str("\n\n");
            }
            "li" => {
                out.push_str("- ");
                out.push_str(element.text().collect::<Vec<_>>().join("").trim());
                out.push('\n');
            }
            "blockquote" => {
                out.push_str("> ");
                out.push_str(element.text().collect::<Vec<_>>().join("").trim());
                out.push_str("\n\n");
            }
            "p" | "br" | "div" => {
                for child in element.children() {
                    if let Some(el) = scraper::ElementRef::wrap(child) {
                        Self::walk(&el, out);
                    } else if let Some(text) = child.value().as_text() {
                        out.push_str(text);
                    }
                }
                out.push('\n');
            }
            _ => {
                for child in element.children() {
                    if let Some(el) = scraper::ElementRef::wrap(child) {
                        Self::walk(&el, out);
                    } else if let Some(text) = child.value().as_text() {
                        out.push_str(text);
                    }
                }
            }
        }
    }
}

impl Extractor for HtmlExtractor {
    fn name(&self) -> &str {
        "html"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot read file: {e}")),
        };
        let document = Html::parse_document(&raw);
        let mut text = self.render(&document);
        text = text
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        if text.is_empty() {
            return ExtractionResult::failure(self.name(), "no visible text after stripping markup");
        }
        ExtractionResult::success(self.name(), text, 0.85)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_renders_heading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><h1>Title</h1><p>Body text</p><script>evil()</script></body></html>").unwrap();
        let result = HtmlExtractor.extract(&path);
        assert!(result.success);
        assert!(result.text.contains("# Title"));
        assert!(result.text.contains("Body text"));
        assert!(!result.text.contains("evil"));
    }
}
