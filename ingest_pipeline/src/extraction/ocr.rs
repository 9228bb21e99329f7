// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! OCR extraction, gated behind the `ocr` feature since it needs a
//! system Tesseract install. Images run through Tesseract directly; PDFs
//! would need rasterization first (out of scope for this feature-gated
//! build — images only).

use crate::config::OcrConfig;
use ingest_domain::entities::ExtractionResult;
use ingest_domain::services::Extractor;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp"];

pub struct OcrExtractor {
    pub config: OcrConfig,
}

impl OcrExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    #[cfg(feature = "ocr")]
    fn preprocess(&self, path: &Path) -> Result<std::path::PathBuf, String> {
        let img = image::open(path).map_err(|e| e.to_string())?;
        let processed = if self.config.preprocess {
            img.grayscale()
        } else {
            img
        };
        let tmp = std::env::temp_dir().join(format!(
            "ocr-preproc-{}.png",
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("page")
        ));
        processed.save(&tmp).map_err(|e| e.to_string())?;
        Ok(tmp)
    }

    #[cfg(feature = "ocr")]
    fn run_tesseract(&self, path: &Path) -> Result<String, String> {
        let image_path = self.preprocess(path)?;
        let args = rusty_tesseract::Args {
            lang: self.config.languages.join("+"),
            psm: Some(self.config.page_segmentation_mode as i32),
            ..Default::default()
        };
        let image = rusty_tesseract::Image::from_path(&image_path).map_err(|e| e.to_string())?;
        rusty_tesseract::image_to_string(&image, &args).map_err(|e| e.to_string())
    }
}

impl Extractor for OcrExtractor {
    fn name(&self) -> &str {
        "ocr"
    }

    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    #[cfg(feature = "ocr")]
    fn extract(&self, path: &Path) -> ExtractionResult {
        match self.run_tesseract(path) {
            Ok(text) if !text.trim().is_empty() => ExtractionResult::success(self.name(), text, 0.6),
            Ok(_) => ExtractionResult::failure(self.name(), "OCR produced no text"),
            Err(e) => ExtractionResult::failure(self.name(), format!("OCR failed: {e}")),
        }
    }

    #[cfg(not(feature = "ocr"))]
    fn extract(&self, _path: &Path) -> ExtractionResult {
        ExtractionResult::failure(self.name(), "OCR support was not compiled in (enable the `ocr` feature)")
    }

    fn min_confidence(&self) -> f64 {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_image_extensions() {
        let e = OcrExtractor::new(OcrConfig::default());
        assert!(e.can_extract(Path::new("scan.png")));
        assert!(!e.can_extract(Path::new("report.pdf")));
    }
}
