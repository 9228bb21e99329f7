// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The global configuration file: named providers, which stages are
//! enabled, performance knobs, logging, and regulatory reference data
//!. Missing `providers` or `pipeline.stages` sections are a
//! fatal-at-startup configuration error.

use ingest_domain::value_objects::AccessMethod;
use ingest_domain::IngestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One named provider's connection shape, before credential resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub access_method: AccessMethod,
    pub endpoint: String,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Which of the seven data-transforming stages run this invocation.
/// `discovery` (seeding `monitored_files`) always runs — the engine has
/// nothing to do without it — so it is not independently toggleable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageToggles {
    pub extraction: bool,
    pub chunking: bool,
    pub enrichment: bool,
    pub audit: bool,
    pub embedding: bool,
    pub normalization: bool,
    pub storage: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            extraction: true,
            chunking: true,
            enrichment: true,
            audit: true,
            embedding: true,
            normalization: true,
            storage: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub stages: StageToggles,
    pub max_workers: usize,
    pub input_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub errors_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stages: StageToggles::default(),
            max_workers: 4,
            input_dir: PathBuf::from("input"),
            processed_dir: PathBuf::from("processed"),
            errors_dir: PathBuf::from("errors"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Regulatory-framework reference data. Parsed and validated here (a
/// malformed section is still a startup configuration error) but read only
/// by the out-of-scope downstream collaborator, not by any core stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatoryConfig {
    pub include_regulatory_frameworks: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub providers: BTreeMap<String, ProviderConfig>,
    pub pipeline: PipelineSettings,
    pub logging: LoggingConfig,
    pub regulatory: RegulatoryConfig,
}

impl GlobalConfig {
    /// Required sections: a config missing `providers` or
    /// `pipeline.stages` is a fatal startup error — checked by parsing
    /// against the raw YAML mapping before typed deserialization loses the
    /// distinction between "absent" and "present but empty".
    pub fn validate_required_sections(raw: &serde_yaml::Value) -> Result<(), IngestError> {
        let mapping = raw.as_mapping().ok_or_else(|| {
            IngestError::configuration("global config root must be a YAML mapping")
        })?;
        if !mapping.contains_key("providers") {
            return Err(IngestError::configuration(
                "global config is missing required section 'providers'",
            ));
        }
        let pipeline = mapping
            .get("pipeline")
            .and_then(|v| v.as_mapping())
            .ok_or_else(|| IngestError::configuration("global config is missing required section 'pipeline'"))?;
        if !pipeline.contains_key("stages") {
            return Err(IngestError::configuration(
                "global config is missing required section 'pipeline.stages'",
            ));
        }
        Ok(())
    }

    pub fn regulatory_frameworks(&self) -> &[String] {
        &self.regulatory.include_regulatory_frameworks
    }

    /// Resolves a named provider's credential, substituting `${VAR}`
    /// placeholders that survived env substitution (e.g. unresolved
    /// `*_API_KEY`/`*_TOKEN` vars become `__unset_NAME__` rather than a
    /// hard failure at load time).
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig, IngestError> {
        self.providers
            .get(name)
            .ok_or_else(|| IngestError::configuration(format!("unknown provider '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_providers_section() {
        let raw: serde_yaml::Value = serde_yaml::from_str("pipeline:\n  stages: {}\n").unwrap();
        let err = GlobalConfig::validate_required_sections(&raw).unwrap_err();
        assert!(err.to_string().contains("providers"));
    }

    #[test]
    fn rejects_missing_stages_subsection() {
        let raw: serde_yaml::Value = serde_yaml::from_str("providers: {}\npipeline: {}\n").unwrap();
        let err = GlobalConfig::validate_required_sections(&raw).unwrap_err();
        assert!(err.to_string().contains("pipeline.stages"));
    }

    #[test]
    fn accepts_well_formed_config() {
        let raw: serde_yaml::Value =
            serde_yaml::from_str("providers:\n  openai: {}\npipeline:\n  stages: {}\n").unwrap();
        assert!(GlobalConfig::validate_required_sections(&raw).is_ok());
    }
}
