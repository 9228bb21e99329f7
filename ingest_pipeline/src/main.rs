// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Composition root: parses and validates CLI flags, loads config,
//! resolves providers, wires every enabled stage into a [`StageEngine`],
//! and runs it once or in a `--watch` loop until a shutdown signal or
//! `Ctrl+C` arrives. Grounded in `ingest_bootstrap`'s `bootstrap_cli`/
//! `ShutdownCoordinator`/`create_signal_handler` and
//! `original_source/rag_framework`'s orchestrator entry point (config load
//! → per-file processing loop → file lifecycle move).

use ingest_bootstrap::shutdown::ShutdownCoordinator;
use ingest_bootstrap::signals::create_signal_handler;
use ingest_bootstrap::{bootstrap_cli, result_to_exit_code, ExitCode, ValidatedCli};
use ingest_domain::services::{EmbeddingProvider, Stage, VectorStore};
use ingest_pipeline::audit::AuditStage;
use ingest_pipeline::chunking::ChunkingStage;
use ingest_pipeline::config::{self, ConfigLoader, EmbeddingConfig, LoadedConfig, StorageConfig};
use ingest_pipeline::embedding::{EmbeddingStage, LocalEmbeddingProvider, OpenAiEmbeddingProvider, SimulatedEmbeddingProvider};
use ingest_pipeline::engine::{FileLifecycle, StageEngine};
use ingest_pipeline::enrichment::EnrichmentStage;
use ingest_pipeline::extraction::{ExtractionStage, OutcomeLog};
use ingest_pipeline::normalization::NormalizationStage;
use ingest_pipeline::provider_registry::ProviderRegistry;
use ingest_pipeline::vector_store::{ChromaVectorStore, MilvusVectorStore, PgVectorStore, QdrantVectorStore, StorageStage, WeaviateVectorStore};
use ingest_pipeline::{Blackboard, IngestError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return std::process::ExitCode::from(ExitCode::UsageError);
        }
    };

    init_tracing(cli.log_level);
    result_to_exit_code(run(&cli).await)
}

fn init_tracing(level: tracing::Level) {
    let filter = EnvFilter::new(level.to_string().to_lowercase());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: &ValidatedCli) -> Result<(), IngestError> {
    if let Err(e) = config::load_env_file(cli.env_file.as_deref()) {
        tracing::warn!(error = %e, "failed to load .env file, continuing without it");
    }

    let loaded = ConfigLoader::load(cli.config_dir())?;

    if cli.status {
        print_status(&loaded);
        return Ok(());
    }

    let registry = ProviderRegistry::new(&loaded.global);
    let outcome_log = OutcomeLog::new();
    let engine = build_engine(&loaded, &registry, outcome_log.clone()).await?;
    tracing::info!(stages = ?engine.stage_names(), "stage engine ready");

    let lifecycle = FileLifecycle::new(
        loaded.global.pipeline.input_dir.clone(),
        loaded.global.pipeline.processed_dir.clone(),
        loaded.global.pipeline.errors_dir.clone(),
    );

    let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
    let signals = create_signal_handler();
    let signal_token = coordinator.token();
    let signal_task = tokio::spawn(async move {
        signals.wait_for_signal(Box::new(move || signal_token.cancel())).await;
    });

    let run_token = coordinator.token();
    loop {
        let files = discover_files(&loaded.global.pipeline.input_dir);
        tracing::info!(count = files.len(), "discovered input files");

        let mut board = Blackboard::new();
        board.monitored_files = Some(files);
        let board = engine.run(board).await?;
        log_run_summary(&board);

        lifecycle.apply(&outcome_log.drain())?;

        if !cli.watch || run_token.is_cancelled() {
            break;
        }

        tokio::select! {
            _ = run_token.cancelled() => break,
            _ = tokio::time::sleep(cli.watch_interval) => {}
        }
    }

    coordinator.initiate_shutdown();
    signal_task.abort();
    Ok(())
}

fn discover_files(input_dir: &Path) -> Vec<std::path::PathBuf> {
    if !input_dir.exists() {
        tracing::warn!(dir = %input_dir.display(), "input directory does not exist");
        return Vec::new();
    }
    walkdir::WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn log_run_summary(board: &Blackboard) {
    let documents = board.extracted_documents.as_ref().map(|d| d.len()).unwrap_or(0);
    let chunks = board.chunks.as_ref().map(|c| c.len()).unwrap_or(0);
    let stored = board.storage_result.as_ref().map(|r| r.stored_count).unwrap_or(0);
    tracing::info!(documents, chunks, stored, "run complete");
}

fn print_status(loaded: &LoadedConfig) {
    println!("providers:");
    for (name, provider) in &loaded.global.providers {
        println!("  {name}: {} ({:?})", provider.endpoint, provider.access_method);
    }
    println!("stages:");
    let stages = &loaded.global.pipeline.stages;
    println!("  extraction:    {}", stages.extraction);
    println!("  chunking:      {}", stages.chunking);
    println!("  enrichment:    {}", stages.enrichment);
    println!("  audit:         {}", stages.audit);
    println!("  embedding:     {}", stages.embedding);
    println!("  normalization: {}", stages.normalization);
    println!("  storage:       {}", stages.storage);
    println!("input_dir: {}", loaded.global.pipeline.input_dir.display());
}

async fn build_engine(
    loaded: &LoadedConfig,
    registry: &ProviderRegistry<'_>,
    outcome_log: OutcomeLog,
) -> Result<StageEngine, IngestError> {
    let toggles = &loaded.global.pipeline.stages;
    let mut stages: Vec<Arc<dyn Stage>> = Vec::new();

    if toggles.extraction {
        stages.push(Arc::new(ExtractionStage::new(
            loaded.extraction.clone(),
            outcome_log,
            loaded.extraction.extracted_json_dir.clone(),
        )?));
    }

    if toggles.chunking {
        let llm_client = resolve_optional_llm(registry, &loaded.chunking.llm_provider, &loaded.chunking.llm_model, 0.0);
        let embedding_provider = if loaded.chunking.strategy == ingest_domain::value_objects::ChunkingStrategy::Semantic {
            Some(build_embedding_provider(&loaded.embedding, registry)?)
        } else {
            None
        };
        stages.push(Arc::new(ChunkingStage::new(loaded.chunking.clone(), llm_client, embedding_provider)));
    }

    if toggles.enrichment {
        let llm_client = if loaded.enrichment.use_llm_sensitivity {
            resolve_optional_llm(registry, &loaded.enrichment.llm_provider, &loaded.enrichment.llm_model, loaded.enrichment.temperature)
        } else {
            None
        };
        stages.push(Arc::new(EnrichmentStage::new(loaded.enrichment.clone(), llm_client)));
    }

    if toggles.audit {
        let llm_client = if loaded.audit.narrative.enabled {
            resolve_optional_llm(registry, &loaded.audit.narrative.provider, &loaded.audit.narrative.model, 0.3)
        } else {
            None
        };
        stages.push(Arc::new(AuditStage::new(loaded.audit.clone(), llm_client)));
    }

    if toggles.embedding {
        let provider = build_embedding_provider(&loaded.embedding, registry)?;
        stages.push(Arc::new(EmbeddingStage::new(loaded.embedding.clone(), provider, true)?));
    }

    if toggles.normalization {
        stages.push(Arc::new(NormalizationStage::new(loaded.normalization.clone())));
    }

    if toggles.storage {
        let store = build_vector_store(&loaded.storage, registry).await?;
        stages.push(Arc::new(StorageStage::new(loaded.storage.clone(), store)));
    }

    StageEngine::new(stages)
}

/// Resolves an optional LLM collaborator; an empty provider name means the
/// stage should run without one rather than treating it as a startup
/// error, since several stages only need it for one optional feature.
fn resolve_optional_llm(
    registry: &ProviderRegistry<'_>,
    provider_name: &str,
    model: &str,
    temperature: f64,
) -> Option<ingest_pipeline::llm_client::LlmClient> {
    if provider_name.is_empty() {
        return None;
    }
    match registry.llm_client(provider_name, model, temperature) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(provider = provider_name, error = %e, "failed to resolve LLM provider, continuing without it");
            None
        }
    }
}

fn build_embedding_provider(
    config: &EmbeddingConfig,
    registry: &ProviderRegistry<'_>,
) -> Result<Arc<dyn EmbeddingProvider>, IngestError> {
    match config.provider.as_str() {
        "local" => Ok(Arc::new(LocalEmbeddingProvider::new(config.model.clone(), config.dimensions))),
        "simulated" => Ok(Arc::new(SimulatedEmbeddingProvider::new(config.model.clone(), config.dimensions))),
        other => {
            let resolved = registry.resolve(other)?;
            Ok(Arc::new(OpenAiEmbeddingProvider::new(
                other,
                resolved.endpoint,
                resolved.credential,
                config.model.clone(),
                config.dimensions,
            )))
        }
    }
}

async fn build_vector_store(config: &StorageConfig, registry: &ProviderRegistry<'_>) -> Result<Arc<dyn VectorStore>, IngestError> {
    let provider_name = config.provider.as_deref().unwrap_or(config.backend.as_str());
    match config.backend.as_str() {
        "chroma" => {
            let resolved = registry.resolve(provider_name)?;
            Ok(Arc::new(ChromaVectorStore::new(resolved.endpoint)))
        }
        "qdrant" => {
            let resolved = registry.resolve(provider_name)?;
            Ok(Arc::new(QdrantVectorStore::new(resolved.endpoint, resolved.credential)))
        }
        "weaviate" => {
            let resolved = registry.resolve(provider_name)?;
            Ok(Arc::new(WeaviateVectorStore::new(resolved.endpoint, resolved.credential)))
        }
        "milvus" => {
            let resolved = registry.resolve(provider_name)?;
            Ok(Arc::new(MilvusVectorStore::new(resolved.endpoint, resolved.credential)))
        }
        "pgvector" => {
            let resolved = registry.resolve(provider_name)?;
            Ok(Arc::new(PgVectorStore::connect(&resolved.endpoint, "ingest_").await?))
        }
        other => Err(IngestError::configuration(format!("unknown storage backend '{other}'"))),
    }
}
