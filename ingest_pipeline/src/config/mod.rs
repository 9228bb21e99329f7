// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Configuration loading: `${VAR}` substitution, the global config file,
//! per-stage typed configs, and the loader that ties them together.

pub mod env_subst;
pub mod global;
pub mod loader;
pub mod stage_configs;

pub use env_subst::{load_env_file, substitute_env};
pub use global::{GlobalConfig, LoggingConfig, PipelineSettings, ProviderConfig, RegulatoryConfig, StageToggles};
pub use loader::{ConfigLoader, LoadedConfig};
pub use stage_configs::{
    AuditConfig, ChunkingConfig, CleaningConfig, EmbeddingConfig, EnrichmentConfig, ExtractionConfig,
    NarrativeConfig, NormalizationConfig, OcrConfig, RateLimitConfig, StorageConfig,
};
