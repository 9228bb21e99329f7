// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Office document extraction: DOCX/DOCM via paragraph + table text join, PPTX/PPTM via
//! slide-shape text join. Both report a structure-count metadata field.

use ingest_domain::entities::ExtractionResult;
use ingest_domain::services::Extractor;
use std::io::Read;
use std::path::Path;

const WORD_EXTENSIONS: &[&str] = &["docx", "docm"];
const SLIDE_EXTENSIONS: &[&str] = &["pptx", "pptm"];

pub struct OfficeExtractor;

impl OfficeExtractor {
    fn extract_word(&self, path: &Path) -> ExtractionResult {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot read file: {e}")),
        };
        let document = match docx_rs::read_docx(&bytes) {
            Ok(d) => d,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot parse DOCX: {e:?}")),
        };
        let mut out = String::new();
        let mut paragraph_count = 0usize;
        for child in &document.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let text = paragraph_text(p);
                if !text.trim().is_empty() {
                    out.push_str(text.trim());
                    out.push('\n');
                    paragraph_count += 1;
                }
            }
            if let docx_rs::DocumentChild::Table(t) = child {
                out.push_str(&table_text(t));
            }
        }
        if out.trim().is_empty() {
            return ExtractionResult::failure(self.name(), "DOCX had no extractable paragraphs");
        }
        ExtractionResult::success(self.name(), out, 0.9)
            .with_metadata("paragraph_count", serde_json::Value::from(paragraph_count))
    }

    fn extract_slides(&self, path: &Path) -> ExtractionResult {
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot open file: {e}")),
        };
        let mut archive = match zip::ZipArchive::new(file) {
            Ok(a) => a,
            Err(e) => return ExtractionResult::failure(self.name(), format!("cannot open PPTX archive: {e}")),
        };
        let mut slide_names: Vec<String> = (0..archive.len())
            .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .collect();
        slide_names.sort_by_key(|name| slide_sort_key(name));

        let mut out = String::new();
        let mut slide_count = 0usize;
        for name in &slide_names {
            let mut entry = match archive.by_name(name) {
                Ok(e) => e,
                Err(_) => continue,
            };
            let mut xml = String::new();
            if entry.read_to_string(&mut xml).is_err() {
                continue;
            }
            let text = slide_text_from_xml(&xml);
            if !text.trim().is_empty() {
                out.push_str(text.trim());
                out.push_str("\n\n");
            }
            slide_count += 1;
        }
        if out.trim().is_empty() {
            return ExtractionResult::failure(self.name(), "PPTX had no extractable slide text");
        }
        ExtractionResult::success(self.name(), out, 0.85)
            .with_metadata("slide_count", serde_json::Value::from(slide_count))
    }
}

fn slide_sort_key(name: &str) -> usize {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &p.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(t) = run_child {
                    out.push_str(&t.text);
                }
            }
        }
    }
    out
}

fn table_text(t: &docx_rs::Table) -> String {
    let mut out = String::new();
    for row in &t.rows {
        let docx_rs::TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(p) = content {
                    out.push_str(&paragraph_text(p));
                    out.push(' ');
                }
            }
        }
        out.push('\n');
    }
    out
}

fn slide_text_from_xml(xml: &str) -> String {
    use quick_xml::events::Event;
    use quick_xml::reader::Reader;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut out = String::new();
    let mut in_text_node = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => in_text_node = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => {
                in_text_node = false;
                out.push(' ');
            }
            Ok(Event::Text(t)) if in_text_node => {
                if let Ok(unescaped) = t.unescape() {
                    out.push_str(&unescaped);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    out
}

impl Extractor for OfficeExtractor {
    fn name(&self) -> &str {
        "office_fast"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let lower = e.to_lowercase();
                WORD_EXTENSIONS.contains(&lower.as_str()) || SLIDE_EXTENSIONS.contains(&lower.as_str())
            })
            .unwrap_or(false)
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if WORD_EXTENSIONS.contains(&ext.as_str()) => self.extract_word(path),
            Some(ext) if SLIDE_EXTENSIONS.contains(&ext.as_str()) => self.extract_slides(path),
            _ => ExtractionResult::failure(self.name(), "unsupported office extension"),
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
    fn recognizes_word_and_slide_extensions() {
        let e = OfficeExtractor;
        assert!(e.can_extract(Path::new("report.docx")));
        assert!(e.can_extract(Path::new("deck.pptx")));
        assert!(!e.can_extract(Path::new("notes.txt")));
    }

    #[test]
    fn slide_xml_extracts_text_runs() {
        let xml = r#"<p:sld><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Hello</a:t></a:r><a:r><a:t>World</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;
        let text = slide_text_from_xml(xml);
        assert!(text.contains("Hello"));
        assert!(text.contains("World"));
    }
}
