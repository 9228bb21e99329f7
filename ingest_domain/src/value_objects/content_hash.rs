// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Hex-encoded SHA-256 content hash, used both for chunk enrichment
//! (`EnrichedChunk::content_hash`) and as the embedding cache key input.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    /// `hex(SHA256(text))`, lowercase.
    pub fn of_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// `hex(SHA256(text | provider | model))`, used as the embedding cache
    /// key (see `CacheEntry`).
    pub fn of_cache_key(text: &str, provider: &str, model: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(b"|");
        hasher.update(provider.as_bytes());
        hasher.update(b"|");
        hasher.update(model.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_hashes_to_known_value() {
        let hash = ContentHash::of_text("hello");
        assert_eq!(
            hash.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn cache_key_differs_by_provider_and_model() {
        let a = ContentHash::of_cache_key("abc", "openai", "text-embedding-3");
        let b = ContentHash::of_cache_key("abc", "openai", "other-model");
        assert_ne!(a, b);
    }

    proptest::proptest! {
        /// `of_text` is deterministic and always yields a 64-character
        /// lowercase hex string, for any input text.
        #[test]
        fn of_text_is_deterministic_and_well_formed(text in ".*") {
            let a = ContentHash::of_text(&text);
            let b = ContentHash::of_text(&text);
            proptest::prop_assert_eq!(&a, &b);
            proptest::prop_assert_eq!(a.as_str().len(), 64);
            proptest::prop_assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
