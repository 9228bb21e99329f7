// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! On-disk embedding cache record. Keyed by
//! `SHA-256(text | provider | model)`; a read is a hit only while
//! `now - timestamp <= ttl_days`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub embedding: Vec<f32>,
    pub provider: String,
    pub model: String,
}

impl CacheEntry {
    pub fn new(embedding: Vec<f32>, provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            embedding,
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn is_stale(&self, ttl_days: i64, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.timestamp);
        age.num_days() > ttl_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_entry_is_not_stale() {
        let entry = CacheEntry::new(vec![0.1, 0.2], "openai", "text-embedding-3");
        assert!(!entry.is_stale(7, Utc::now()));
    }

    #[test]
    fn entry_past_ttl_is_stale() {
        let entry = CacheEntry::new(vec![0.1, 0.2], "openai", "text-embedding-3");
        let future = Utc::now() + Duration::days(8);
        assert!(entry.is_stale(7, future));
    }
}
