// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Builds the ordered extractor chain for a profile and runs the
//! first-validated-wins selection loop. Profile orderings are
//! resolved from `original_source/rag_framework/extractors/fallback_manager.py`'s
//! `PROFILES` table, since the distilled spec leaves the exact lists
//! unspecified.

use crate::config::ExtractionConfig;
use crate::extraction::html::HtmlExtractor;
use crate::extraction::ocr::OcrExtractor;
use crate::extraction::office::OfficeExtractor;
use crate::extraction::pdf::{PdfFastExtractor, PdfLayoutExtractor, PdfMlExtractor};
use crate::extraction::plain_text::PlainTextExtractor;
use crate::extraction::tabular::TabularExtractor;
use ingest_domain::entities::ExtractionResult;
use ingest_domain::services::{Extractor, ExtractionOutcome};
use ingest_domain::IngestError;
use std::path::Path;
use std::time::Instant;

/// One extractor attempt's outcome, kept for the session metrics summary
/// and for the "all extractors failed" error message.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub extractor_name: String,
    pub outcome: String,
    pub elapsed_seconds: f64,
}

pub struct FallbackManager {
    extractors: Vec<Box<dyn Extractor>>,
}

impl FallbackManager {
    pub fn new(config: &ExtractionConfig) -> Result<Self, IngestError> {
        let ordered_names = Self::profile_names(config)?;
        let mut extractors: Vec<Box<dyn Extractor>> = Vec::with_capacity(ordered_names.len());
        for name in &ordered_names {
            extractors.push(Self::build(name, config)?);
        }
        Ok(Self { extractors })
    }

    fn profile_names(config: &ExtractionConfig) -> Result<Vec<String>, IngestError> {
        use ingest_domain::value_objects::ExtractionProfile as P;
        let mut names: Vec<String> = match config.profile {
            P::Speed | P::Memory => vec!["plain_text", "tabular", "html", "office_fast", "pdf_fast"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            P::Compromise => vec!["plain_text", "tabular", "html", "office_fast", "pdf_fast", "pdf_layout", "ocr"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            P::Quality => vec![
                "plain_text",
                "tabular",
                "html",
                "office_fast",
                "pdf_fast",
                "pdf_layout",
                "pdf_ml",
                "ocr",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            P::Custom => {
                if config.custom_extractors.is_empty() {
                    return Err(IngestError::configuration(
                        "extraction profile 'custom' requires a non-empty custom_extractors list",
                    ));
                }
                config.custom_extractors.clone()
            }
        };
        if !config.use_vlm {
            names.retain(|n| n != "pdf_ml");
        }
        for name in &names {
            if !KNOWN_EXTRACTOR_NAMES.contains(&name.as_str()) {
                return Err(IngestError::configuration(format!("unknown extractor name '{name}'")));
            }
        }
        Ok(names)
    }

    fn build(name: &str, config: &ExtractionConfig) -> Result<Box<dyn Extractor>, IngestError> {
        Ok(match name {
            "plain_text" => Box::new(PlainTextExtractor),
            "tabular" => Box::new(TabularExtractor),
            "html" => Box::new(HtmlExtractor),
            "office_fast" => Box::new(OfficeExtractor),
            "pdf_fast" => Box::new(PdfFastExtractor),
            "pdf_layout" => Box::new(PdfLayoutExtractor),
            "pdf_ml" => Box::new(PdfMlExtractor::default()),
            "ocr" => Box::new(OcrExtractor::new(config.ocr.clone())),
            other => return Err(IngestError::configuration(format!("unknown extractor name '{other}'"))),
        })
    }

    /// Runs the selection loop against one file and returns the winning
    /// result plus a full attempt log for the metrics summary.
    pub fn extract(&self, path: &Path, min_text_length: usize, min_confidence: f64) -> (Result<ExtractionResult, IngestError>, Vec<AttemptRecord>) {
        let mut attempts = Vec::new();
        for extractor in &self.extractors {
            if !extractor.can_extract(path) {
                continue;
            }
            let start = Instant::now();
            let mut result = extractor.extract(path);
            let elapsed = start.elapsed().as_secs_f64();
            result = result.with_metadata("extraction_time_seconds", serde_json::Value::from(elapsed));

            let effective_min_text = min_text_length.max(extractor.min_text_length());
            let effective_min_confidence = min_confidence.max(extractor.min_confidence());
            let validated = result.validate(effective_min_text, effective_min_confidence);

            let outcome = if validated {
                ExtractionOutcome::Validated(result.clone())
            } else if result.success {
                ExtractionOutcome::Invalid(result.clone())
            } else {
                ExtractionOutcome::Error(result.error.clone().unwrap_or_default())
            };

            attempts.push(AttemptRecord {
                extractor_name: extractor.name().to_string(),
                outcome: match &outcome {
                    ExtractionOutcome::Validated(_) => "validated".to_string(),
                    ExtractionOutcome::Invalid(_) => "invalid".to_string(),
                    ExtractionOutcome::Error(e) => format!("error: {e}"),
                },
                elapsed_seconds: elapsed,
            });

            if validated {
                return (Ok(result), attempts);
            }
        }
        let reasons = attempts
            .iter()
            .map(|a| format!("{}={}", a.extractor_name, a.outcome))
            .collect::<Vec<_>>();
        (
            Err(IngestError::AllExtractorsFailed {
                path: path.display().to_string(),
                attempts: reasons,
            }),
            attempts,
        )
    }
}

const KNOWN_EXTRACTOR_NAMES: &[&str] = &[
    "plain_text",
    "tabular",
    "html",
    "office_fast",
    "pdf_fast",
    "pdf_layout",
    "pdf_ml",
    "ocr",
];

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_domain::value_objects::ExtractionProfile;

    #[test]
    fn speed_profile_excludes_ocr_and_layout() {
        let config = ExtractionConfig { profile: ExtractionProfile::Speed, ..ExtractionConfig::default() };
        let names = FallbackManager::profile_names(&config).unwrap();
        assert!(!names.contains(&"ocr".to_string()));
        assert!(!names.contains(&"pdf_layout".to_string()));
    }

    #[test]
    fn quality_profile_drops_pdf_ml_without_vlm() {
        let config = ExtractionConfig { profile: ExtractionProfile::Quality, use_vlm: false, ..ExtractionConfig::default() };
        let names = FallbackManager::profile_names(&config).unwrap();
        assert!(!names.contains(&"pdf_ml".to_string()));
    }

    #[test]
    fn custom_profile_requires_extractor_list() {
        let config = ExtractionConfig { profile: ExtractionProfile::Custom, custom_extractors: vec![], ..ExtractionConfig::default() };
        assert!(FallbackManager::profile_names(&config).is_err());
    }

    #[test]
    fn custom_profile_rejects_unknown_extractor_name() {
        let config = ExtractionConfig {
            profile: ExtractionProfile::Custom,
            custom_extractors: vec!["not_a_real_extractor".to_string()],
            ..ExtractionConfig::default()
        };
        assert!(FallbackManager::profile_names(&config).is_err());
    }

    #[test]
    fn first_validated_extractor_wins() {
        let config = ExtractionConfig::default();
        let manager = FallbackManager::new(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world, this is plenty of text").unwrap();
        let (result, attempts) = manager.extract(&path, 1, 0.0);
        let extracted = result.unwrap();
        assert_eq!(extracted.extractor_name, "plain_text");
        assert_eq!(attempts.len(), 1);
    }
}
