// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Loads `global.yaml` plus the optional per-stage YAML files out of a
//! `--config-dir` directory, applying `${VAR}` substitution
//! before parsing and flattening each stage file's `parameters:` mapping
//! into the `HashMap<String, String>` shape `FromParameters` expects.

use crate::config::env_subst::substitute_env;
use crate::config::global::GlobalConfig;
use crate::config::stage_configs::{
    AuditConfig, ChunkingConfig, EmbeddingConfig, EnrichmentConfig, ExtractionConfig,
    NormalizationConfig, StorageConfig,
};
use ingest_domain::services::FromParameters;
use ingest_domain::IngestError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Every config value this run needs, assembled from `--config-dir`.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub global: GlobalConfig,
    pub extraction: ExtractionConfig,
    pub chunking: ChunkingConfig,
    pub enrichment: EnrichmentConfig,
    pub audit: AuditConfig,
    pub embedding: EmbeddingConfig,
    pub normalization: NormalizationConfig,
    pub storage: StorageConfig,
}

/// Reads and validates a `--config-dir` tree: `global.yaml` is
/// mandatory, each stage's `<name>.yaml` is optional and falls back to
/// that stage config's documented defaults when absent.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_dir: &Path) -> Result<LoadedConfig, IngestError> {
        let global = Self::load_global(&config_dir.join("global.yaml"))?;
        Ok(LoadedConfig {
            extraction: ExtractionConfig::from_parameters(&Self::load_stage_params(
                &config_dir.join("extraction.yaml"),
            )?)?,
            chunking: ChunkingConfig::from_parameters(&Self::load_stage_params(
                &config_dir.join("chunking.yaml"),
            )?)?,
            enrichment: EnrichmentConfig::from_parameters(&Self::load_stage_params(
                &config_dir.join("enrichment.yaml"),
            )?)?,
            audit: AuditConfig::from_parameters(&Self::load_stage_params(&config_dir.join("audit.yaml"))?)?,
            embedding: EmbeddingConfig::from_parameters(&Self::load_stage_params(
                &config_dir.join("embedding.yaml"),
            )?)?,
            normalization: NormalizationConfig::from_parameters(&Self::load_stage_params(
                &config_dir.join("normalization.yaml"),
            )?)?,
            storage: StorageConfig::from_parameters(&Self::load_stage_params(
                &config_dir.join("storage.yaml"),
            )?)?,
            global,
        })
    }

    fn load_global(path: &PathBuf) -> Result<GlobalConfig, IngestError> {
        let raw_text = std::fs::read_to_string(path)
            .map_err(|e| IngestError::configuration(format!("cannot read {}: {e}", path.display())))?;
        let substituted = substitute_env(&raw_text)?;
        let raw_value: serde_yaml::Value = serde_yaml::from_str(&substituted)
            .map_err(|e| IngestError::configuration(format!("invalid YAML in {}: {e}", path.display())))?;
        GlobalConfig::validate_required_sections(&raw_value)?;
        serde_yaml::from_value(raw_value)
            .map_err(|e| IngestError::configuration(format!("cannot deserialize {}: {e}", path.display())))
    }

    /// Reads an optional per-stage file's `parameters:` mapping into a flat
    /// string map. A missing file yields an empty map (stage config uses its
    /// defaults); scalars stringify directly, sequences join with `,`, and
    /// nested mappings are re-encoded as JSON so list/keyword-map fields can
    /// still be carried through the flat `FromParameters` contract.
    fn load_stage_params(path: &Path) -> Result<HashMap<String, String>, IngestError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let raw_text = std::fs::read_to_string(path)
            .map_err(|e| IngestError::configuration(format!("cannot read {}: {e}", path.display())))?;
        let substituted = substitute_env(&raw_text)?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&substituted)
            .map_err(|e| IngestError::configuration(format!("invalid YAML in {}: {e}", path.display())))?;
        let parameters = doc
            .get("parameters")
            .cloned()
            .unwrap_or(serde_yaml::Value::Mapping(Default::default()));
        let mapping = parameters
            .as_mapping()
            .ok_or_else(|| IngestError::configuration(format!("{}: 'parameters' must be a mapping", path.display())))?;
        let mut out = HashMap::with_capacity(mapping.len());
        for (k, v) in mapping {
            let key = k
                .as_str()
                .ok_or_else(|| IngestError::configuration(format!("{}: non-string parameter key", path.display())))?
                .to_string();
            out.insert(key, Self::stringify(v));
        }
        Ok(out)
    }

    fn stringify(value: &serde_yaml::Value) -> String {
        match value {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Null => String::new(),
            serde_yaml::Value::Sequence(seq) => seq
                .iter()
                .map(|v| match v {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => Self::stringify(other),
                })
                .collect::<Vec<_>>()
                .join(","),
            serde_yaml::Value::Mapping(_) | serde_yaml::Value::Tagged(_) => {
                serde_json::to_string(value).unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn loads_global_and_falls_back_on_missing_stage_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "global.yaml",
            "providers:\n  openai:\n    access_method: openai_compatible\n    endpoint: https://api.openai.com/v1\n\
             pipeline:\n  stages: {}\n",
        );
        let loaded = ConfigLoader::load(dir.path()).unwrap();
        assert!(loaded.global.providers.contains_key("openai"));
        assert_eq!(loaded.chunking.chunk_size, 1000);
    }

    #[test]
    fn stage_parameters_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "global.yaml",
            "providers: {}\npipeline:\n  stages: {}\n",
        );
        write(
            dir.path(),
            "chunking.yaml",
            "parameters:\n  strategy: fixed\n  chunk_size: 500\n  overlap: 50\n",
        );
        let loaded = ConfigLoader::load(dir.path()).unwrap();
        assert_eq!(loaded.chunking.chunk_size, 500);
        assert_eq!(loaded.chunking.overlap, 50);
    }

    #[test]
    fn missing_global_yaml_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::load(dir.path()).unwrap_err();
        assert!(matches!(err, IngestError::Configuration(_)));
    }
}
