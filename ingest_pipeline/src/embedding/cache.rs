// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! On-disk embedding cache. Grounded in
//! `original_source/rag_framework/steps/step_06_embedding.py`'s
//! `_get_cache_key`/`_load_from_cache`/`_save_to_cache`/`_cleanup_expired_cache`:
//! one JSON file per cache key under `cache_dir`, keyed by
//! `SHA-256(text|provider|model)` (`ContentHash::of_cache_key`), with
//! expired entries removed both lazily on read and eagerly in a startup
//! sweep.

use ingest_domain::entities::CacheEntry;
use ingest_domain::value_objects::ContentHash;
use ingest_domain::IngestError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    cache_dir: PathBuf,
    ttl_days: i64,
}

impl EmbeddingCache {
    pub fn new(cache_dir: impl Into<PathBuf>, ttl_days: i64) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl_days,
        }
    }

    fn path_for(&self, key: &ContentHash) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key.as_str()))
    }

    /// Creates `cache_dir` if missing, then removes any entry already past
    /// its TTL. Mirrors the Python step's startup `_cleanup_expired_cache`
    /// pass; failures to read/parse an individual file are logged and
    /// skipped rather than treated as fatal.
    pub fn prepare(&self) -> Result<(), IngestError> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| IngestError::Cache(format!("cannot create cache dir {}: {e}", self.cache_dir.display())))?;

        let now = chrono::Utc::now();
        let mut expired = 0u64;
        let entries = match std::fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "cannot list embedding cache directory for cleanup");
                return Ok(());
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_entry(&path) {
                Ok(cache_entry) if cache_entry.is_stale(self.ttl_days, now) => {
                    let _ = std::fs::remove_file(&path);
                    expired += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable cache file during cleanup"),
            }
        }
        if expired > 0 {
            tracing::info!(expired, "embedding cache cleanup removed expired entries");
        }
        Ok(())
    }

    /// Returns the cached embedding for `(text, provider, model)` if present
    /// and not past its TTL; a stale entry is deleted and treated as a miss.
    pub fn get(&self, text: &str, provider: &str, model: &str) -> Option<Vec<f32>> {
        let key = ContentHash::of_cache_key(text, provider, model);
        let path = self.path_for(&key);
        if !path.exists() {
            return None;
        }
        match Self::read_entry(&path) {
            Ok(entry) => {
                if entry.is_stale(self.ttl_days, chrono::Utc::now()) {
                    let _ = std::fs::remove_file(&path);
                    None
                } else {
                    Some(entry.embedding)
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error reading embedding cache entry");
                None
            }
        }
    }

    pub fn put(&self, text: &str, provider: &str, model: &str, embedding: Vec<f32>) {
        let key = ContentHash::of_cache_key(text, provider, model);
        let path = self.path_for(&key);
        let entry = CacheEntry::new(embedding, provider, model);
        if let Err(e) = Self::write_entry(&path, &entry) {
            tracing::warn!(path = %path.display(), error = %e, "error saving embedding cache entry");
        }
    }

    fn read_entry(path: &Path) -> Result<CacheEntry, IngestError> {
        let raw = std::fs::read_to_string(path)?;
        let entry: CacheEntry = serde_json::from_str(&raw)?;
        Ok(entry)
    }

    /// Writes via a sibling temp file plus rename, so a concurrent reader
    /// never observes a half-written entry.
    fn write_entry(path: &Path, entry: &CacheEntry) -> Result<(), IngestError> {
        let json = serde_json::to_string(entry)?;
        let tmp_path = path.with_extension(format!("json.tmp.{}", uuid::Uuid::new_v4()));
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit_after_put() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path(), 30);
        cache.prepare().unwrap();

        assert!(cache.get("hello", "openai", "text-embedding-3").is_none());
        cache.put("hello", "openai", "text-embedding-3", vec![0.1, 0.2, 0.3]);
        assert_eq!(cache.get("hello", "openai", "text-embedding-3"), Some(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn different_provider_or_model_is_a_distinct_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path(), 30);
        cache.put("hello", "openai", "text-embedding-3", vec![1.0]);
        assert!(cache.get("hello", "openai", "other-model").is_none());
        assert!(cache.get("hello", "mistral_ai", "text-embedding-3").is_none());
    }

    #[test]
    fn stale_entry_is_evicted_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path(), 7);
        let key = ContentHash::of_cache_key("hello", "openai", "m");
        let path = cache.path_for(&key);
        let mut stale = CacheEntry::new(vec![0.5], "openai", "m");
        stale.timestamp = chrono::Utc::now() - chrono::Duration::days(8);
        EmbeddingCache::write_entry(&path, &stale).unwrap();

        assert!(cache.get("hello", "openai", "m").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn prepare_sweeps_expired_entries_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path(), 1);
        let key = ContentHash::of_cache_key("old", "openai", "m");
        let path = cache.path_for(&key);
        std::fs::create_dir_all(dir.path()).unwrap();
        let mut stale = CacheEntry::new(vec![0.1], "openai", "m");
        stale.timestamp = chrono::Utc::now() - chrono::Duration::days(10);
        EmbeddingCache::write_entry(&path, &stale).unwrap();

        cache.prepare().unwrap();
        assert!(!path.exists());
    }
}
