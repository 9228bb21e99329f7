// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-stage configuration structs, each built from the flat
//! `HashMap<String, String>` parameter map a stage's YAML file is loaded
//! into (`ingest_domain::services::FromParameters`, mirroring the teacher's
//! `StageService` configuration pattern). Structured values (lists, keyword
//! maps) are carried as comma-separated or JSON-encoded strings within that
//! flat map, the same shape the teacher's own per-stage YAML takes.

use ingest_domain::value_objects::{ChunkingStrategy, DistanceMetric, ExtractionProfile, Sensitivity};
use ingest_domain::services::FromParameters;
use ingest_domain::IngestError;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

fn get<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|s| s.as_str())
}

fn get_or(params: &HashMap<String, String>, key: &str, default: &str) -> String {
    get(params, key).unwrap_or(default).to_string()
}

fn parse_or<T: std::str::FromStr>(params: &HashMap<String, String>, key: &str, default: T) -> Result<T, IngestError> {
    match get(params, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| IngestError::validation(key, format!("cannot parse '{raw}'"))),
    }
}

fn parse_list(params: &HashMap<String, String>, key: &str, default: &[&str]) -> Vec<String> {
    match get(params, key) {
        None => default.iter().map(|s| s.to_string()).collect(),
        Some(raw) if raw.trim().is_empty() => Vec::new(),
        Some(raw) => raw.split(',').map(|s| s.trim().to_string()).collect(),
    }
}

fn parse_keyword_map(params: &HashMap<String, String>, key: &str) -> BTreeMap<String, Vec<String>> {
    match get(params, key) {
        None => BTreeMap::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CleaningConfig {
    pub normalize_whitespace: bool,
    pub strip_page_numbers: bool,
    pub remove_blank_lines: bool,
    pub min_line_length: usize,
    pub strip_html_tags: bool,
    pub lowercase: bool,
    pub strip_special_chars: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            strip_page_numbers: false,
            remove_blank_lines: false,
            min_line_length: 0,
            strip_html_tags: false,
            lowercase: false,
            strip_special_chars: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub languages: Vec<String>,
    pub page_segmentation_mode: u32,
    pub preprocess: bool,
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
            page_segmentation_mode: 3,
            preprocess: true,
            dpi: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub profile: ExtractionProfile,
    pub use_vlm: bool,
    pub custom_extractors: Vec<String>,
    pub min_text_length: usize,
    pub min_confidence: f64,
    pub cleaning: CleaningConfig,
    pub ocr: OcrConfig,
    pub tabular_format: String,
    pub max_workers: usize,
    pub extracted_json_dir: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            profile: ExtractionProfile::Compromise,
            use_vlm: false,
            custom_extractors: Vec::new(),
            min_text_length: 10,
            min_confidence: 0.3,
            cleaning: CleaningConfig::default(),
            ocr: OcrConfig::default(),
            tabular_format: "markdown".to_string(),
            max_workers: 4,
            extracted_json_dir: None,
        }
    }
}

impl FromParameters for ExtractionConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        let profile = get(params, "profile")
            .map(|s| s.parse::<ExtractionProfile>())
            .transpose()
            .map_err(|e| IngestError::validation("profile", e))?
            .unwrap_or(default.profile);
        if profile == ExtractionProfile::Custom && get(params, "custom_extractors").is_none() {
            return Err(IngestError::validation(
                "custom_extractors",
                "required when profile=custom",
            ));
        }
        Ok(Self {
            profile,
            use_vlm: parse_or(params, "use_vlm", default.use_vlm)?,
            custom_extractors: parse_list(params, "custom_extractors", &[]),
            min_text_length: parse_or(params, "min_text_length", default.min_text_length)?,
            min_confidence: parse_or(params, "min_confidence", default.min_confidence)?,
            cleaning: CleaningConfig {
                normalize_whitespace: parse_or(params, "clean_normalize_whitespace", default.cleaning.normalize_whitespace)?,
                strip_page_numbers: parse_or(params, "clean_strip_page_numbers", default.cleaning.strip_page_numbers)?,
                remove_blank_lines: parse_or(params, "clean_remove_blank_lines", default.cleaning.remove_blank_lines)?,
                min_line_length: parse_or(params, "clean_min_line_length", default.cleaning.min_line_length)?,
                strip_html_tags: parse_or(params, "clean_strip_html_tags", default.cleaning.strip_html_tags)?,
                lowercase: parse_or(params, "clean_lowercase", default.cleaning.lowercase)?,
                strip_special_chars: parse_or(params, "clean_strip_special_chars", default.cleaning.strip_special_chars)?,
            },
            ocr: OcrConfig {
                languages: parse_list(params, "ocr_languages", &["eng"]),
                page_segmentation_mode: parse_or(params, "ocr_psm", default.ocr.page_segmentation_mode)?,
                preprocess: parse_or(params, "ocr_preprocess", default.ocr.preprocess)?,
                dpi: parse_or(params, "ocr_dpi", default.ocr.dpi)?,
            },
            tabular_format: get_or(params, "tabular_format", &default.tabular_format),
            max_workers: parse_or(params, "max_workers", default.max_workers)?,
            extracted_json_dir: get(params, "extracted_json_dir").map(PathBuf::from),
        })
    }
}

// ---------------------------------------------------------------------
// Chunking
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub strategy: ChunkingStrategy,
    pub chunk_size: usize,
    pub overlap: usize,
    pub separators: Vec<String>,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub similarity_threshold: f32,
    pub llm_single_call_budget: usize,
    pub llm_prompt_template: String,
    /// Provider/model used by `llm_guided` boundary analysis, mirroring
    /// `step_03_chunking.py`'s `llm_config` section. Empty means unset —
    /// the strategy falls back to recursive chunking per-call.
    pub llm_provider: String,
    pub llm_model: String,
    pub drop_empty_chunks: bool,
    pub rate_limit: RateLimitConfig,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::Recursive,
            chunk_size: 1000,
            overlap: 200,
            separators: vec![
                "\n\n\n".to_string(),
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                "".to_string(),
            ],
            min_chunk_size: 50,
            max_chunk_size: 2000,
            similarity_threshold: 0.6,
            llm_single_call_budget: 6000,
            llm_prompt_template: "Identify natural section boundaries in the following text and reply with \
                JSON of the form {\"boundaries\": [byte offsets]}.\n\n{text}"
                .to_string(),
            llm_provider: String::new(),
            llm_model: String::new(),
            drop_empty_chunks: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl FromParameters for ChunkingConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        let strategy = get(params, "strategy")
            .map(|s| s.parse::<ChunkingStrategy>())
            .transpose()
            .map_err(|e| IngestError::validation("strategy", e))?
            .unwrap_or(default.strategy);
        let chunk_size: usize = parse_or(params, "chunk_size", default.chunk_size)?;
        let overlap: usize = parse_or(params, "overlap", default.overlap)?;
        if overlap >= chunk_size {
            return Err(IngestError::validation("overlap", "must be smaller than chunk_size"));
        }
        let min_chunk_size: usize = parse_or(params, "min_chunk_size", default.min_chunk_size)?;
        let max_chunk_size: usize = parse_or(params, "max_chunk_size", default.max_chunk_size)?;
        if min_chunk_size > max_chunk_size {
            return Err(IngestError::validation(
                "min_chunk_size",
                "must be <= max_chunk_size",
            ));
        }
        Ok(Self {
            strategy,
            chunk_size,
            overlap,
            separators: parse_list(
                params,
                "separators",
                &["\n\n\n", "\n\n", "\n", " ", ""],
            ),
            min_chunk_size,
            max_chunk_size,
            similarity_threshold: parse_or(params, "similarity_threshold", default.similarity_threshold)?,
            llm_single_call_budget: parse_or(params, "llm_single_call_budget", default.llm_single_call_budget)?,
            llm_prompt_template: get_or(params, "llm_prompt_template", &default.llm_prompt_template),
            llm_provider: get_or(params, "llm_provider", &default.llm_provider),
            llm_model: get_or(params, "llm_model", &default.llm_model),
            drop_empty_chunks: parse_or(params, "drop_empty_chunks", default.drop_empty_chunks)?,
            rate_limit: RateLimitConfig::from_parameters(params)?,
        })
    }
}

// ---------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub default_sensitivity: Sensitivity,
    pub use_llm_sensitivity: bool,
    pub llm_provider: String,
    pub llm_model: String,
    pub temperature: f64,
    pub document_type_keywords: BTreeMap<String, Vec<String>>,
    pub regulatory_keywords: BTreeMap<String, Vec<String>>,
    pub rate_limit: RateLimitConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        let mut document_type_keywords = BTreeMap::new();
        document_type_keywords.insert("contract".to_string(), vec!["contract".into(), "agreement".into()]);
        document_type_keywords.insert(
            "audit_report".to_string(),
            vec!["audit".into(), "audit report".into()],
        );
        document_type_keywords.insert("policy".to_string(), vec!["policy".into(), "politique".into()]);
        document_type_keywords.insert("procedure".to_string(), vec!["procedure".into(), "procédure".into()]);

        let mut regulatory_keywords = BTreeMap::new();
        regulatory_keywords.insert(
            "RGPD".to_string(),
            vec!["rgpd".into(), "gdpr".into(), "données personnelles".into()],
        );
        regulatory_keywords.insert("ISO27001".to_string(), vec!["iso 27001".into(), "iso27001".into()]);
        regulatory_keywords.insert("SOC2".to_string(), vec!["soc 2".into(), "soc2".into()]);

        Self {
            default_sensitivity: Sensitivity::Interne,
            use_llm_sensitivity: false,
            llm_provider: String::new(),
            llm_model: String::new(),
            temperature: 0.0,
            document_type_keywords,
            regulatory_keywords,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl FromParameters for EnrichmentConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        let default_sensitivity = get(params, "default_sensitivity")
            .map(|s| s.parse::<Sensitivity>())
            .transpose()
            .map_err(|e| IngestError::validation("default_sensitivity", e))?
            .unwrap_or(default.default_sensitivity);
        let document_type_keywords = {
            let parsed = parse_keyword_map(params, "document_type_keywords");
            if parsed.is_empty() {
                default.document_type_keywords.clone()
            } else {
                parsed
            }
        };
        let regulatory_keywords = {
            let parsed = parse_keyword_map(params, "regulatory_keywords");
            if parsed.is_empty() {
                default.regulatory_keywords.clone()
            } else {
                parsed
            }
        };
        Ok(Self {
            default_sensitivity,
            use_llm_sensitivity: parse_or(params, "use_llm_sensitivity", default.use_llm_sensitivity)?,
            llm_provider: get_or(params, "llm_provider", &default.llm_provider),
            llm_model: get_or(params, "llm_model", &default.llm_model),
            temperature: parse_or(params, "temperature", default.temperature)?,
            document_type_keywords,
            regulatory_keywords,
            rate_limit: RateLimitConfig::from_parameters(params)?,
        })
    }
}

// ---------------------------------------------------------------------
// Audit & PII
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub template: String,
    pub persist_format: Option<String>,
    pub persist_path_template: String,
    pub include_metadata: bool,
    pub include_raw_record: bool,
    pub rate_limit: RateLimitConfig,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: String::new(),
            model: String::new(),
            template: "Summarize the audit run at {timestamp}: {documents_processed} documents, \
                {chunks_created} chunks, {total_pii_found} PII matches."
                .to_string(),
            persist_format: None,
            persist_path_template: "output/audit/summary_{timestamp}.{format}".to_string(),
            include_metadata: true,
            include_raw_record: false,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub audit_log_path: PathBuf,
    pub pii_detection_enabled: bool,
    pub narrative: NarrativeConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            audit_log_path: PathBuf::from("output/audit/trail.jsonl"),
            pii_detection_enabled: true,
            narrative: NarrativeConfig::default(),
        }
    }
}

impl FromParameters for AuditConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        Ok(Self {
            audit_log_path: get(params, "audit_log_path")
                .map(PathBuf::from)
                .unwrap_or(default.audit_log_path),
            pii_detection_enabled: parse_or(params, "pii_detection_enabled", default.pii_detection_enabled)?,
            narrative: NarrativeConfig {
                enabled: parse_or(params, "narrative_enabled", default.narrative.enabled)?,
                provider: get_or(params, "narrative_provider", &default.narrative.provider),
                model: get_or(params, "narrative_model", &default.narrative.model),
                template: get_or(params, "narrative_template", &default.narrative.template),
                persist_format: get(params, "narrative_persist_format").map(str::to_string),
                persist_path_template: get_or(
                    params,
                    "narrative_persist_path_template",
                    &default.narrative.persist_path_template,
                ),
                include_metadata: parse_or(params, "narrative_include_metadata", default.narrative.include_metadata)?,
                include_raw_record: parse_or(
                    params,
                    "narrative_include_raw_record",
                    default.narrative.include_raw_record,
                )?,
                rate_limit: RateLimitConfig::from_parameters(params)?,
            },
        })
    }
}

// ---------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub delay_between_requests_ms: u64,
    pub retry_delay_base_secs: u64,
    pub max_retries: u32,
    pub exponential_backoff: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_ms: 0,
            retry_delay_base_secs: 1,
            max_retries: 3,
            exponential_backoff: true,
        }
    }
}

impl FromParameters for RateLimitConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        Ok(Self {
            delay_between_requests_ms: parse_or(
                params,
                "delay_between_requests_ms",
                default.delay_between_requests_ms,
            )?,
            retry_delay_base_secs: parse_or(params, "retry_delay_base_secs", default.retry_delay_base_secs)?,
            max_retries: parse_or(params, "max_retries", default.max_retries)?,
            exponential_backoff: parse_or(params, "exponential_backoff", default.exponential_backoff)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    pub max_text_length: usize,
    pub cache_dir: PathBuf,
    pub ttl_days: i64,
    pub rate_limit: RateLimitConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "simulated".to_string(),
            model: "simulated-384".to_string(),
            dimensions: 384,
            batch_size: 16,
            max_text_length: 8000,
            cache_dir: PathBuf::from("output/embedding_cache"),
            ttl_days: 30,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl FromParameters for EmbeddingConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        let dimensions: usize = parse_or(params, "dimensions", default.dimensions)?;
        if dimensions == 0 {
            return Err(IngestError::validation("dimensions", "must be > 0"));
        }
        Ok(Self {
            provider: get_or(params, "provider", &default.provider),
            model: get_or(params, "model", &default.model),
            dimensions,
            batch_size: parse_or(params, "batch_size", default.batch_size)?,
            max_text_length: parse_or(params, "max_text_length", default.max_text_length)?,
            cache_dir: get(params, "cache_dir").map(PathBuf::from).unwrap_or(default.cache_dir),
            ttl_days: parse_or(params, "ttl_days", default.ttl_days)?,
            rate_limit: RateLimitConfig::from_parameters(params)?,
        })
    }
}

// ---------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NormalizationConfig {
    pub unicode_form: Option<String>,
    pub strip_accents: bool,
    pub standardize_quotes: bool,
    pub skip_invalid: bool,
    pub metadata_whitelist: Vec<String>,
    pub drop_null_metadata: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            unicode_form: Some("NFC".to_string()),
            strip_accents: false,
            standardize_quotes: true,
            skip_invalid: true,
            metadata_whitelist: vec!["text".into(), "source_file".into(), "chunk_index".into(), "document_type".into()],
            drop_null_metadata: true,
        }
    }
}

impl FromParameters for NormalizationConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        let unicode_form = match get(params, "unicode_form") {
            None => default.unicode_form.clone(),
            Some(s) if s.eq_ignore_ascii_case("none") || s.is_empty() => None,
            Some(s) => Some(s.to_uppercase()),
        };
        if let Some(ref form) = unicode_form {
            if !matches!(form.as_str(), "NFC" | "NFKC" | "NFD" | "NFKD") {
                return Err(IngestError::validation("unicode_form", format!("unknown form '{form}'")));
            }
        }
        Ok(Self {
            unicode_form,
            strip_accents: parse_or(params, "strip_accents", default.strip_accents)?,
            standardize_quotes: parse_or(params, "standardize_quotes", default.standardize_quotes)?,
            skip_invalid: parse_or(params, "skip_invalid", default.skip_invalid)?,
            metadata_whitelist: parse_list(
                params,
                "metadata_whitelist",
                &["text", "source_file", "chunk_index", "document_type"],
            ),
            drop_null_metadata: parse_or(params, "drop_null_metadata", default.drop_null_metadata)?,
        })
    }
}

// ---------------------------------------------------------------------
// Vector storage
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: String,
    pub provider: Option<String>,
    pub collection: String,
    pub distance_metric: DistanceMetric,
    pub batch_size: usize,
    pub delete_by_source: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "chroma".to_string(),
            provider: None,
            collection: "documents".to_string(),
            distance_metric: DistanceMetric::Cosine,
            batch_size: 100,
            delete_by_source: true,
        }
    }
}

impl FromParameters for StorageConfig {
    fn from_parameters(params: &HashMap<String, String>) -> Result<Self, IngestError> {
        let default = Self::default();
        let distance_metric = get(params, "distance_metric")
            .map(|s| s.parse::<DistanceMetric>())
            .transpose()
            .map_err(|e| IngestError::validation("distance_metric", e))?
            .unwrap_or(default.distance_metric);
        Ok(Self {
            backend: get_or(params, "backend", &default.backend),
            provider: get(params, "provider").map(str::to_string),
            collection: get_or(params, "collection", &default.collection),
            distance_metric,
            batch_size: parse_or(params, "batch_size", default.batch_size)?,
            delete_by_source: parse_or(params, "delete_by_source", default.delete_by_source)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_rejects_overlap_ge_chunk_size() {
        let mut params = HashMap::new();
        params.insert("chunk_size".to_string(), "100".to_string());
        params.insert("overlap".to_string(), "100".to_string());
        assert!(ChunkingConfig::from_parameters(&params).is_err());
    }

    #[test]
    fn extraction_custom_profile_requires_extractor_list() {
        let mut params = HashMap::new();
        params.insert("profile".to_string(), "custom".to_string());
        assert!(ExtractionConfig::from_parameters(&params).is_err());
        params.insert("custom_extractors".to_string(), "plain_text,html".to_string());
        let cfg = ExtractionConfig::from_parameters(&params).unwrap();
        assert_eq!(cfg.custom_extractors, vec!["plain_text", "html"]);
    }

    #[test]
    fn embedding_defaults_round_trip() {
        let cfg = EmbeddingConfig::from_parameters(&HashMap::new()).unwrap();
        assert_eq!(cfg.dimensions, 384);
        assert_eq!(cfg.rate_limit.max_retries, 3);
    }
}
